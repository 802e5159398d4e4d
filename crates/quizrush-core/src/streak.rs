//! Consecutive-correct-answer tracking.

use serde::{Deserialize, Serialize};

/// Streak length from which a correct answer triggers the streak cue.
pub const STREAK_CUE_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakTracker {
    current: u32,
    best: u32,
}

impl StreakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Record one answer and return the streak after it.
    pub fn record(&mut self, correct: bool) -> u32 {
        if correct {
            self.current += 1;
        } else {
            self.current = 0;
        }
        self.best = self.best.max(self.current);
        self.current
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
