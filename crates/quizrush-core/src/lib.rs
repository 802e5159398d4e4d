//! quizrush-core — Live scored quiz engine.
//!
//! This crate defines the data model, the play-session state machine and its
//! parts (clock, scoring, streaks, power-ups), the collaborator traits, and
//! the async engine that drives a session in real time.

pub mod clock;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod powerups;
pub mod scoring;
pub mod session;
pub mod streak;
pub mod traits;
