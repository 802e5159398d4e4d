//! Error types.
//!
//! `StoreError` represents failures talking to a question/result store. It is
//! defined in `quizrush-core` so the play engine can downcast and classify
//! errors for retry decisions without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with a quiz store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store rejected our credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The store returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The store returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// A local file could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),
}

impl StoreError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        match self {
            StoreError::NotFound(_) | StoreError::Unauthorized(_) => true,
            StoreError::Api { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Why a quiz could not be loaded. Fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("could not load quiz '{0}': quiz not found")]
    NotFound(String),

    #[error("could not load quiz '{0}': quiz has no questions")]
    Empty(String),

    #[error("could not load quiz: question '{id}' is malformed: {reason}")]
    MalformedQuestion { id: String, reason: String },

    #[error("could not load quiz '{quiz_id}': {message}")]
    Store { quiz_id: String, message: String },
}

impl LoadError {
    /// Classify a loader failure for `quiz_id`.
    pub fn from_store(quiz_id: &str, err: &anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::NotFound(_)) => LoadError::NotFound(quiz_id.to_string()),
            _ => LoadError::Store {
                quiz_id: quiz_id.to_string(),
                message: format!("{err:#}"),
            },
        }
    }
}
