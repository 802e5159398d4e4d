//! One-shot power-ups and their per-question effects.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::model::{PowerUp, Question};

/// Number of wrong options fifty-fifty removes.
pub const FIFTY_FIFTY_HIDES: usize = 2;

/// Tracks which power-ups a session has spent and what is active on the
/// current question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PowerUpBank {
    used: BTreeSet<PowerUp>,
    double_jeopardy: bool,
    time_freeze: bool,
    hidden: BTreeSet<usize>,
}

impl PowerUpBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_used(&self, power_up: PowerUp) -> bool {
        self.used.contains(&power_up)
    }

    pub fn used(&self) -> impl Iterator<Item = PowerUp> + '_ {
        self.used.iter().copied()
    }

    pub fn available(&self) -> Vec<PowerUp> {
        PowerUp::ALL
            .into_iter()
            .filter(|p| !self.used.contains(p))
            .collect()
    }

    pub fn double_jeopardy_active(&self) -> bool {
        self.double_jeopardy
    }

    pub fn time_freeze_active(&self) -> bool {
        self.time_freeze
    }

    /// Options hidden on the current question.
    pub fn hidden_options(&self) -> &BTreeSet<usize> {
        &self.hidden
    }

    /// Mark `power_up` consumed and switch its effect on for the current
    /// question. Returns `false` (and changes nothing) if it was already used.
    ///
    /// Fifty-fifty needs the question and a random source to pick which wrong
    /// options to hide.
    pub fn consume<R: Rng + ?Sized>(
        &mut self,
        power_up: PowerUp,
        question: &Question,
        rng: &mut R,
    ) -> bool {
        if !self.used.insert(power_up) {
            return false;
        }
        match power_up {
            PowerUp::DoubleJeopardy => self.double_jeopardy = true,
            PowerUp::TimeFreeze => self.time_freeze = true,
            PowerUp::FiftyFifty => self.hidden = pick_hidden_options(question, rng),
        }
        true
    }

    /// Drop per-question effects. Consumed flags stay.
    pub fn clear_question_effects(&mut self) {
        self.double_jeopardy = false;
        self.time_freeze = false;
        self.hidden.clear();
    }

    /// Forget everything, including what was consumed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Choose up to two incorrect option indices uniformly at random.
pub fn pick_hidden_options<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> BTreeSet<usize> {
    question
        .incorrect_indices()
        .choose_multiple(rng, FIFTY_FIFTY_HIDES)
        .copied()
        .collect()
}
