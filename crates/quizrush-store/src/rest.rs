//! REST store backed by a PostgREST-style hosted database.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use quizrush_core::error::StoreError;
use quizrush_core::model::{LeaderboardEntry, Question};
use quizrush_core::traits::{LeaderboardReader, QuestionLoader, QuizResult, ResultSubmitter};

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Client for the hosted quiz database.
pub struct RestStore {
    api_key: String,
    /// `<base_url>/rest/v1/`, the root every table and RPC path joins onto.
    rest_root: reqwest::Url,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        let root = format!("{}/rest/v1/", base_url.trim_end_matches('/'));
        let rest_root = reqwest::Url::parse(&root)
            .with_context(|| format!("invalid REST base URL: {base_url}"))?;

        Ok(Self {
            api_key: api_key.to_string(),
            rest_root,
            client,
        })
    }

    /// Build the URL for `path`, percent-encoding every query value.
    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<reqwest::Url, StoreError> {
        let mut url = self.rest_root.join(path).map_err(|e| StoreError::Api {
            status: 0,
            message: format!("invalid request path '{path}': {e}"),
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::RequestBuilder, StoreError> {
        Ok(self
            .client
            .request(method, self.url(path, query)?)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key))
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> Result<reqwest::Response, StoreError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                StoreError::Timeout(DEFAULT_TIMEOUT_SECS)
            } else {
                StoreError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1)
                * 1000;
            return Err(StoreError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Unauthorized(body));
        }
        if status == 404 {
            return Err(StoreError::NotFound(what.to_string()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RestErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(StoreError::Api { status, message });
        }
        Ok(response)
    }
}

fn parse_error(e: reqwest::Error) -> StoreError {
    StoreError::Api {
        status: 0,
        message: format!("failed to parse response: {e}"),
    }
}

#[derive(Deserialize)]
struct RestErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct QuestionRow {
    id: String,
    question_text: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    order_index: Option<i64>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question {
            id: row.id,
            text: row.question_text,
            options: row.options,
            correct_answer: row.correct_answer,
            order: row.order_index,
        }
    }
}

#[derive(Deserialize)]
struct ScoreRow {
    user_id: String,
    score: u64,
}

#[derive(Serialize)]
struct AwardExperience<'a> {
    p_user_id: &'a str,
    p_amount: u64,
}

#[async_trait]
impl QuestionLoader for RestStore {
    #[instrument(skip(self))]
    async fn load_questions(&self, quiz_id: &str) -> anyhow::Result<Vec<Question>> {
        let filter = format!("eq.{quiz_id}");
        let request = self.request(
            reqwest::Method::GET,
            "questions",
            &[("quiz_id", filter.as_str()), ("order", "order_index.asc")],
        )?;
        let response = self.send(request, &format!("quiz '{quiz_id}'")).await?;
        let rows: Vec<QuestionRow> = response.json().await.map_err(parse_error)?;
        if rows.is_empty() {
            return Err(StoreError::NotFound(format!("quiz '{quiz_id}'")).into());
        }
        Ok(rows.into_iter().map(Question::from).collect())
    }
}

#[async_trait]
impl ResultSubmitter for RestStore {
    #[instrument(skip(self, result), fields(quiz_id = %result.quiz_id))]
    async fn submit_result(&self, result: &QuizResult) -> anyhow::Result<()> {
        let request = self
            .request(reqwest::Method::POST, "quiz_results", &[])?
            .header("Prefer", "return=minimal")
            .json(result);
        self.send(request, "quiz_results").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn award_experience(&self, user_id: &str, delta: u64) -> anyhow::Result<()> {
        let request = self
            .request(reqwest::Method::POST, "rpc/award_experience", &[])?
            .json(&AwardExperience {
                p_user_id: user_id,
                p_amount: delta,
            });
        self.send(request, "award_experience").await?;
        Ok(())
    }
}

#[async_trait]
impl LeaderboardReader for RestStore {
    #[instrument(skip(self))]
    async fn top_scores(
        &self,
        quiz_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        // No server-side limit: one player can hold many of the top rows, so
        // the cut happens after keeping each player's best.
        let filter = format!("eq.{quiz_id}");
        let request = self.request(
            reqwest::Method::GET,
            "quiz_results",
            &[
                ("select", "user_id,score"),
                ("quiz_id", filter.as_str()),
                ("order", "score.desc"),
            ],
        )?;
        let response = self.send(request, "quiz_results").await?;
        let rows: Vec<ScoreRow> = response.json().await.map_err(parse_error)?;

        // rows are score-descending, so the first row per user is their best
        let mut seen = HashSet::new();
        Ok(rows
            .into_iter()
            .filter(|r| seen.insert(r.user_id.clone()))
            .take(limit)
            .map(|r| LeaderboardEntry {
                display_name: r.user_id,
                score: r.score,
            })
            .collect())
    }
}
