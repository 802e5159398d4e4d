//! File-backed store.
//!
//! Layout under the data directory:
//!
//! ```text
//! quizzes/*.toml      quiz definitions (see `quizrush_core::parser`)
//! results.jsonl       one `QuizResult` per line, append-only
//! experience.jsonl    one `{"user_id", "delta", "awarded_at"}` per line
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::instrument;

use quizrush_core::error::StoreError;
use quizrush_core::model::{LeaderboardEntry, Question};
use quizrush_core::parser::load_quiz_directory;
use quizrush_core::traits::{
    rank_results, LeaderboardReader, QuestionLoader, QuizResult, ResultSubmitter,
};

const QUIZ_DIR: &str = "quizzes";
const RESULTS_FILE: &str = "results.jsonl";
const EXPERIENCE_FILE: &str = "experience.jsonl";

#[derive(Debug, Serialize, Deserialize)]
struct ExperienceAward {
    user_id: String,
    delta: u64,
    awarded_at: DateTime<Utc>,
}

/// Store that reads quizzes from TOML files and appends results to JSON lines.
pub struct FileStore {
    data_dir: PathBuf,
    /// Serialises appends from this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn quiz_dir(&self) -> PathBuf {
        self.data_dir.join(QUIZ_DIR)
    }

    /// Sum of every experience award recorded for `user_id`.
    pub fn experience_of(&self, user_id: &str) -> Result<u64, StoreError> {
        Ok(read_lines::<ExperienceAward>(&self.data_dir.join(EXPERIENCE_FILE))?
            .into_iter()
            .filter(|a| a.user_id == user_id)
            .map(|a| a.delta)
            .sum())
    }

    /// Every stored result, oldest first.
    pub fn results(&self) -> Result<Vec<QuizResult>, StoreError> {
        read_lines(&self.data_dir.join(RESULTS_FILE))
    }

    async fn append<T: Serialize>(&self, file: &str, record: &T) -> Result<(), StoreError> {
        let line = serde_json::to_string(record).map_err(|e| StoreError::Io(e.to_string()))?;
        let _guard = self.write_lock.lock().await;
        std::fs::create_dir_all(&self.data_dir).map_err(io_err(&self.data_dir))?;
        let path = self.data_dir.join(file);
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err(&path))?;
        writeln!(f, "{line}").map_err(io_err(&path))?;
        Ok(())
    }
}

fn io_err(path: &Path) -> impl Fn(std::io::Error) -> StoreError + '_ {
    move |e| StoreError::Io(format!("{}: {e}", path.display()))
}

/// Read a JSON-lines file. A missing file is empty; bad lines are skipped.
fn read_lines<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_err(path)(e)),
    };
    Ok(content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| match serde_json::from_str(l) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("skipping bad line in {}: {e}", path.display());
                None
            }
        })
        .collect())
}

#[async_trait]
impl QuestionLoader for FileStore {
    #[instrument(skip(self))]
    async fn load_questions(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>> {
        let dir = self.quiz_dir();
        if !dir.is_dir() {
            return Err(StoreError::NotFound(format!("quiz directory {}", dir.display())).into());
        }
        let quiz = load_quiz_directory(&dir)?
            .into_iter()
            .find(|q| q.id == quiz_id)
            .ok_or_else(|| StoreError::NotFound(format!("quiz '{quiz_id}'")))?;
        Ok(quiz.questions)
    }
}

#[async_trait]
impl ResultSubmitter for FileStore {
    #[instrument(skip(self, result), fields(quiz_id = %result.quiz_id))]
    async fn submit_result(&self, result: &QuizResult) -> anyhow::Result<()> {
        self.append(RESULTS_FILE, result).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn award_experience(&self, user_id: &str, delta: u64) -> anyhow::Result<()> {
        let award = ExperienceAward {
            user_id: user_id.to_string(),
            delta,
            awarded_at: Utc::now(),
        };
        self.append(EXPERIENCE_FILE, &award).await?;
        Ok(())
    }
}

#[async_trait]
impl LeaderboardReader for FileStore {
    async fn top_scores(
        &self,
        quiz_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        Ok(rank_results(&self.results()?, quiz_id, limit))
    }
}
