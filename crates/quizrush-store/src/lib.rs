//! quizrush-store — Question, result and leaderboard stores.
//!
//! Implements the `QuestionLoader`, `ResultSubmitter` and `LeaderboardReader`
//! traits for an in-memory store, a local file store and a hosted REST
//! database, plus the configuration that picks between them.

pub mod config;
pub mod file;
pub mod memory;
pub mod rest;

pub use config::{
    create_store, load_config, load_config_from, Backend, QuizrushConfig, StoreConfig,
};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use rest::RestStore;
