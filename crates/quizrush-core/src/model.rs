//! Core data model types for quizrush.
//!
//! These are the fundamental types that the entire quizrush system uses
//! to represent questions, power-ups and per-question outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: String,
    /// The question text shown to the player.
    pub text: String,
    /// Answer options, in display order.
    pub options: Vec<String>,
    /// The correct option. Must equal one of `options`.
    pub correct_answer: String,
    /// Explicit ordering key within the quiz.
    #[serde(default)]
    pub order: Option<i64>,
}

impl Question {
    /// Index of the option holding the correct answer.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_answer)
    }

    /// Whether `option` (an index into `options`) is the correct answer.
    pub fn is_correct(&self, option: usize) -> bool {
        self.options
            .get(option)
            .is_some_and(|o| *o == self.correct_answer)
    }

    /// Indices of every incorrect option.
    pub fn incorrect_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, o)| **o != self.correct_answer)
            .map(|(i, _)| i)
            .collect()
    }
}

/// The one-shot abilities a player may spend during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PowerUp {
    /// Doubles the score of the current question.
    DoubleJeopardy,
    /// Halts the countdown for the rest of the current question.
    TimeFreeze,
    /// Hides two incorrect options of the current question.
    FiftyFifty,
}

impl PowerUp {
    pub const ALL: [PowerUp; 3] = [
        PowerUp::DoubleJeopardy,
        PowerUp::TimeFreeze,
        PowerUp::FiftyFifty,
    ];
}

impl fmt::Display for PowerUp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerUp::DoubleJeopardy => write!(f, "double-jeopardy"),
            PowerUp::TimeFreeze => write!(f, "time-freeze"),
            PowerUp::FiftyFifty => write!(f, "fifty-fifty"),
        }
    }
}

impl FromStr for PowerUp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "double-jeopardy" | "double_jeopardy" | "dj" => Ok(PowerUp::DoubleJeopardy),
            "time-freeze" | "time_freeze" | "freeze" => Ok(PowerUp::TimeFreeze),
            "fifty-fifty" | "fifty_fifty" | "50-50" | "5050" => Ok(PowerUp::FiftyFifty),
            other => Err(format!("unknown power-up: {other}")),
        }
    }
}

/// The locked-in result of one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    /// Question this outcome belongs to.
    pub question_id: String,
    /// Selected option index, `None` when the clock ran out.
    pub selected: Option<usize>,
    /// Whether the selection was correct.
    pub correct: bool,
    /// Clock value at the instant the answer was locked.
    pub time_remaining: u32,
    /// Time-derived part of the base score (0 when incorrect).
    pub time_bonus: u32,
    /// Points added to the session score for this question.
    pub points: u64,
    /// Streak value after this answer.
    pub streak: u32,
}

impl AnswerOutcome {
    pub fn timed_out(&self) -> bool {
        self.selected.is_none()
    }
}

/// A quiz as stored: metadata plus its questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Description of this quiz.
    #[serde(default)]
    pub description: String,
    /// The questions, in stored order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A single leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub display_name: String,
    pub score: u64,
}
