//! Core trait definitions for the quiz engine's external collaborators.
//!
//! These async traits are implemented by the `quizrush-store` crate. The
//! engine only ever calls them at session boundaries: loading before the
//! countdown, submitting after results.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{LeaderboardEntry, Question};
use crate::session::SessionSummary;

// ---------------------------------------------------------------------------
// Question loading
// ---------------------------------------------------------------------------

/// Source of question sets.
#[async_trait]
pub trait QuestionLoader: Send + Sync {
    /// Fetch the questions of `quiz_id`, in stored order.
    ///
    /// Should fail with `StoreError::NotFound` when the quiz does not exist.
    async fn load_questions(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>>;
}

// ---------------------------------------------------------------------------
// Result submission
// ---------------------------------------------------------------------------

/// Persists finished sessions and the player's experience total.
#[async_trait]
pub trait ResultSubmitter: Send + Sync {
    /// Append a completed result.
    async fn submit_result(&self, result: &QuizResult) -> anyhow::Result<()>;

    /// Add `delta` to the player's persistent experience counter.
    async fn award_experience(&self, user_id: &str, delta: u64) -> anyhow::Result<()>;
}

/// A completed play-through as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub session_id: Uuid,
    pub quiz_id: String,
    pub user_id: String,
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: u64,
    pub best_streak: u32,
    pub experience: u64,
    pub completed_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn from_summary(summary: &SessionSummary, user_id: &str) -> Self {
        Self {
            session_id: summary.session_id,
            quiz_id: summary.quiz_id.clone(),
            user_id: user_id.to_string(),
            correct_count: summary.correct_count,
            total_questions: summary.total_questions,
            score: summary.total_score,
            best_streak: summary.best_streak,
            experience: summary.experience,
            completed_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// Read-only top scores, for display.
#[async_trait]
pub trait LeaderboardReader: Send + Sync {
    async fn top_scores(&self, quiz_id: &str, limit: usize)
        -> anyhow::Result<Vec<LeaderboardEntry>>;
}

/// Best score per player, highest first, at most `limit` rows.
///
/// Shared by stores that keep raw results rather than a ranked view.
pub fn rank_results<'a>(
    results: impl IntoIterator<Item = &'a QuizResult>,
    quiz_id: &str,
    limit: usize,
) -> Vec<LeaderboardEntry> {
    let mut best: std::collections::HashMap<&str, u64> = std::collections::HashMap::new();
    for r in results.into_iter().filter(|r| r.quiz_id == quiz_id) {
        let entry = best.entry(r.user_id.as_str()).or_default();
        *entry = (*entry).max(r.score);
    }

    let mut entries: Vec<LeaderboardEntry> = best
        .into_iter()
        .map(|(name, score)| LeaderboardEntry {
            display_name: name.to_string(),
            score,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    entries.truncate(limit);
    entries
}
