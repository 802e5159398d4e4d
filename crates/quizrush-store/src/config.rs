//! Configuration and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizrush_core::clock::COUNTDOWN_SECS;
use quizrush_core::engine::PlayEngineConfig;
use quizrush_core::scoring::{ScoringRules, QUESTION_TIME};
use quizrush_core::traits::{LeaderboardReader, QuestionLoader, ResultSubmitter};

use crate::file::FileStore;
use crate::memory::MemoryStore;
use crate::rest::RestStore;

/// Where quizzes come from and results go.
///
/// Note: Custom Debug impl masks the API key so it never reaches logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Memory,
    File {
        #[serde(default = "default_data_dir")]
        data_dir: PathBuf,
    },
    Rest {
        base_url: String,
        #[serde(default)]
        api_key: String,
    },
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Memory => f.write_str("Memory"),
            StoreConfig::File { data_dir } => {
                f.debug_struct("File").field("data_dir", data_dir).finish()
            }
            StoreConfig::Rest {
                base_url,
                api_key: _,
            } => f
                .debug_struct("Rest")
                .field("base_url", base_url)
                .field("api_key", &"***")
                .finish(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

/// Top-level quizrush configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizrushConfig {
    #[serde(default)]
    pub store: StoreConfig,
    /// Player name used for results and the leaderboard.
    #[serde(default = "default_user")]
    pub user_id: String,
    /// Seconds on the clock for each question.
    #[serde(default = "default_question_time")]
    pub question_time_secs: u32,
    #[serde(default = "default_countdown")]
    pub countdown_secs: u32,
    /// Wall-clock length of one clock unit in milliseconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_leaderboard_size")]
    pub leaderboard_size: usize,
    /// Max retries on transient store errors while loading.
    #[serde(default = "default_retries")]
    pub max_load_retries: u32,
    /// Delay before the first load retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_user() -> String {
    "player".to_string()
}
fn default_question_time() -> u32 {
    QUESTION_TIME
}
fn default_countdown() -> u32 {
    COUNTDOWN_SECS
}
fn default_tick_interval() -> u64 {
    1000
}
fn default_leaderboard_size() -> usize {
    10
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    500
}

impl Default for QuizrushConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            user_id: default_user(),
            question_time_secs: default_question_time(),
            countdown_secs: default_countdown(),
            tick_interval_ms: default_tick_interval(),
            leaderboard_size: default_leaderboard_size(),
            max_load_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl QuizrushConfig {
    /// Engine settings derived from this config.
    pub fn engine_config(&self) -> PlayEngineConfig {
        PlayEngineConfig {
            rules: ScoringRules {
                question_time: self.question_time_secs,
                ..ScoringRules::default()
            },
            countdown_secs: self.countdown_secs,
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            leaderboard_size: self.leaderboard_size,
            max_load_retries: self.max_load_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        let Some(len) = result[start..].find('}') else {
            break;
        };
        let value = std::env::var(&result[start + 2..start + len]).unwrap_or_default();
        result.replace_range(start..start + len + 1, &value);
    }
    result
}

fn resolve_store_config(config: &StoreConfig) -> StoreConfig {
    match config {
        StoreConfig::Memory => StoreConfig::Memory,
        StoreConfig::File { data_dir } => StoreConfig::File {
            data_dir: PathBuf::from(resolve_env_vars(&data_dir.to_string_lossy())),
        },
        StoreConfig::Rest { base_url, api_key } => StoreConfig::Rest {
            base_url: resolve_env_vars(base_url),
            api_key: resolve_env_vars(api_key),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizrush.toml` in the current directory
/// 2. `~/.config/quizrush/config.toml`
///
/// Environment variable overrides: `QUIZRUSH_API_KEY`, `QUIZRUSH_USER`.
pub fn load_config() -> Result<QuizrushConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizrushConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("quizrush.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizrushConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizrushConfig::default(),
    };

    config.store = resolve_store_config(&config.store);
    config.user_id = resolve_env_vars(&config.user_id);

    // Apply env var overrides
    if let Ok(key) = std::env::var("QUIZRUSH_API_KEY") {
        if let StoreConfig::Rest { api_key, .. } = &mut config.store {
            *api_key = key;
        }
    }
    if let Ok(user) = std::env::var("QUIZRUSH_USER") {
        if !user.is_empty() {
            config.user_id = user;
        }
    }

    if config.user_id.trim().is_empty() {
        config.user_id = default_user();
    }
    if config.question_time_secs == 0 {
        anyhow::bail!("question_time_secs must be at least 1");
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizrush"))
}

/// The three collaborator handles a play engine needs, backed by one store.
#[derive(Clone)]
pub struct Backend {
    pub loader: Arc<dyn QuestionLoader>,
    pub submitter: Arc<dyn ResultSubmitter>,
    pub leaderboard: Arc<dyn LeaderboardReader>,
}

impl Backend {
    /// Share one store for all three roles.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: QuestionLoader + ResultSubmitter + LeaderboardReader + 'static,
    {
        Self {
            loader: store.clone(),
            submitter: store.clone(),
            leaderboard: store,
        }
    }
}

/// Create the store described by `config`.
pub fn create_store(config: &StoreConfig) -> Result<Backend> {
    match config {
        StoreConfig::Memory => Ok(Backend::from_store(Arc::new(MemoryStore::new()))),
        StoreConfig::File { data_dir } => {
            Ok(Backend::from_store(Arc::new(FileStore::new(data_dir))))
        }
        StoreConfig::Rest { base_url, api_key } => {
            if api_key.is_empty() {
                anyhow::bail!("rest store needs an api_key (or QUIZRUSH_API_KEY)");
            }
            Ok(Backend::from_store(Arc::new(RestStore::new(
                base_url, api_key,
            )?)))
        }
    }
}
