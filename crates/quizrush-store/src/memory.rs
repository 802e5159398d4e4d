//! In-memory store for tests and demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizrush_core::error::StoreError;
use quizrush_core::model::{LeaderboardEntry, Question, Quiz};
use quizrush_core::traits::{
    rank_results, LeaderboardReader, QuestionLoader, QuizResult, ResultSubmitter,
};

/// A store that keeps everything in process memory.
///
/// Counts calls and can be told to fail submissions, so the engine's
/// warning path can be exercised without a real backend.
#[derive(Default)]
pub struct MemoryStore {
    /// Quiz id → questions.
    quizzes: Mutex<HashMap<String, Vec<Question>>>,
    /// Results in submission order.
    results: Mutex<Vec<QuizResult>>,
    /// User id → experience total.
    experience: Mutex<HashMap<String, u64>>,
    load_calls: AtomicU32,
    submit_calls: AtomicU32,
    award_calls: AtomicU32,
    fail_submissions: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given quizzes.
    pub fn with_quizzes(quizzes: impl IntoIterator<Item = Quiz>) -> Self {
        let store = Self::new();
        for quiz in quizzes {
            store.insert_quiz(quiz);
        }
        store
    }

    pub fn insert_quiz(&self, quiz: Quiz) {
        self.quizzes
            .lock()
            .unwrap()
            .insert(quiz.id, quiz.questions);
    }

    /// Make every later submission fail with a network error.
    pub fn fail_submissions(&self, fail: bool) {
        self.fail_submissions.store(fail, Ordering::Relaxed);
    }

    pub fn results(&self) -> Vec<QuizResult> {
        self.results.lock().unwrap().clone()
    }

    pub fn experience_of(&self, user_id: &str) -> u64 {
        self.experience
            .lock()
            .unwrap()
            .get(user_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn load_calls(&self) -> u32 {
        self.load_calls.load(Ordering::Relaxed)
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::Relaxed)
    }

    pub fn award_calls(&self) -> u32 {
        self.award_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl QuestionLoader for MemoryStore {
    async fn load_questions(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>> {
        self.load_calls.fetch_add(1, Ordering::Relaxed);
        self.quizzes
            .lock()
            .unwrap()
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("quiz '{quiz_id}'")).into())
    }
}

#[async_trait]
impl ResultSubmitter for MemoryStore {
    async fn submit_result(&self, result: &QuizResult) -> anyhow::Result<()> {
        self.submit_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_submissions.load(Ordering::Relaxed) {
            return Err(StoreError::Network("memory store is offline".into()).into());
        }
        self.results.lock().unwrap().push(result.clone());
        Ok(())
    }

    async fn award_experience(&self, user_id: &str, delta: u64) -> anyhow::Result<()> {
        self.award_calls.fetch_add(1, Ordering::Relaxed);
        if self.fail_submissions.load(Ordering::Relaxed) {
            return Err(StoreError::Network("memory store is offline".into()).into());
        }
        *self
            .experience
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default() += delta;
        Ok(())
    }
}

#[async_trait]
impl LeaderboardReader for MemoryStore {
    async fn top_scores(
        &self,
        quiz_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        Ok(rank_results(self.results.lock().unwrap().iter(), quiz_id, limit))
    }
}
