//! Async driver for a quiz session.
//!
//! Loads a quiz through the collaborators (retrying transient store
//! failures), then runs one play-through on a single task: a tick interval
//! and the player's action channel are multiplexed with `select!`, so a tick
//! can never interleave with a selection. Results are submitted once the
//! session reaches `Results`; submission failures are reported, not fatal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::COUNTDOWN_SECS;
use crate::error::{LoadError, StoreError};
use crate::model::{AnswerOutcome, LeaderboardEntry, PowerUp, Question};
use crate::scoring::ScoringRules;
use crate::session::{QuizSession, SessionEvent, SessionState, SessionSummary};
use crate::traits::{LeaderboardReader, QuestionLoader, QuizResult, ResultSubmitter};

/// Configuration for the play engine.
#[derive(Debug, Clone)]
pub struct PlayEngineConfig {
    /// Scoring formula and question time.
    pub rules: ScoringRules,
    /// Length of the pre-game tick-down.
    pub countdown_secs: u32,
    /// Wall-clock length of one clock unit.
    pub tick_interval: Duration,
    /// Leaderboard rows fetched with the quiz.
    pub leaderboard_size: usize,
    /// Retries on transient store errors while loading.
    pub max_load_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub retry_delay: Duration,
}

impl Default for PlayEngineConfig {
    fn default() -> Self {
        Self {
            rules: ScoringRules::default(),
            countdown_secs: COUNTDOWN_SECS,
            tick_interval: Duration::from_secs(1),
            leaderboard_size: 10,
            max_load_retries: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Input from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Select(usize),
    PowerUp(PowerUp),
    Next,
    Abandon,
}

/// Receives session events as they happen.
pub trait SessionObserver: Send + Sync {
    fn on_event(&self, session: &QuizSession, event: &SessionEvent);
    fn on_warning(&self, _message: &str) {}
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_event(&self, _: &QuizSession, _: &SessionEvent) {}
}

/// A quiz ready to play.
#[derive(Debug)]
pub struct LoadedQuiz {
    pub session: QuizSession,
    /// Leaderboard at load time; empty if it could not be read.
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// How a play-through ended.
#[derive(Debug, Clone)]
pub enum PlayOutcome {
    Completed(PlayReport),
    /// The player left before results; nothing was persisted.
    Abandoned { answered: usize },
}

/// A completed play-through and what happened to its submission.
#[derive(Debug, Clone)]
pub struct PlayReport {
    pub summary: SessionSummary,
    pub outcomes: Vec<AnswerOutcome>,
    pub result_saved: bool,
    pub experience_awarded: bool,
    /// Non-fatal problems to show next to the results.
    pub warnings: Vec<String>,
}

/// The play engine.
pub struct PlayEngine {
    loader: Arc<dyn QuestionLoader>,
    submitter: Arc<dyn ResultSubmitter>,
    leaderboard: Arc<dyn LeaderboardReader>,
    config: PlayEngineConfig,
}

impl PlayEngine {
    pub fn new(
        loader: Arc<dyn QuestionLoader>,
        submitter: Arc<dyn ResultSubmitter>,
        leaderboard: Arc<dyn LeaderboardReader>,
        config: PlayEngineConfig,
    ) -> Self {
        Self {
            loader,
            submitter,
            leaderboard,
            config,
        }
    }

    pub fn config(&self) -> &PlayEngineConfig {
        &self.config
    }

    /// Fetch the question set and leaderboard, and put a new session into
    /// its countdown.
    pub async fn load(
        &self,
        quiz_id: &str,
        observer: &dyn SessionObserver,
    ) -> Result<LoadedQuiz, LoadError> {
        let mut session = QuizSession::new(quiz_id, self.config.rules.clone())
            .with_countdown(self.config.countdown_secs);

        let (questions, board) = futures::future::join(
            self.load_questions(quiz_id),
            self.leaderboard
                .top_scores(quiz_id, self.config.leaderboard_size),
        )
        .await;

        let leaderboard = board.unwrap_or_else(|e| {
            tracing::warn!("leaderboard unavailable for '{quiz_id}': {e:#}");
            observer.on_warning(&format!("leaderboard unavailable: {e}"));
            Vec::new()
        });

        let events = match questions {
            Ok(questions) => session.begin(questions),
            Err(e) => Err(e),
        };
        match events {
            Ok(events) => {
                for event in &events {
                    observer.on_event(&session, event);
                }
                Ok(LoadedQuiz {
                    session,
                    leaderboard,
                })
            }
            Err(e) => {
                // `begin` has already failed the session on a bad question set
                session.fail(&e);
                let event = SessionEvent::LoadFailed {
                    reason: e.to_string(),
                };
                observer.on_event(&session, &event);
                Err(e)
            }
        }
    }

    /// Call the loader, retrying transient store errors with exponential backoff.
    async fn load_questions(&self, quiz_id: &str) -> Result<Vec<Question>, LoadError> {
        let mut last_error = None;
        let mut retry_delay = self.config.retry_delay;

        for retry in 0..=self.config.max_load_retries {
            if retry > 0 {
                tokio::time::sleep(retry_delay).await;
                retry_delay = (retry_delay * 2).min(Duration::from_secs(60));
            }
            match self.loader.load_questions(quiz_id).await {
                Ok(questions) => return Ok(questions),
                Err(e) => {
                    let store_err = e.downcast_ref::<StoreError>();
                    if store_err.is_some_and(StoreError::is_permanent) {
                        return Err(LoadError::from_store(quiz_id, &e));
                    }
                    // Use the store's retry-after hint if available
                    if let Some(ms) = store_err.and_then(StoreError::retry_after_ms) {
                        retry_delay = Duration::from_millis(ms);
                    }
                    tracing::warn!(retry, "loading '{quiz_id}' failed: {e:#}");
                    last_error = Some(e);
                }
            }
        }

        Err(match last_error {
            Some(e) => LoadError::from_store(quiz_id, &e),
            None => LoadError::NotFound(quiz_id.to_string()),
        })
    }

    /// Run `session` from its current countdown to results or abandonment.
    ///
    /// Closing the action channel counts as abandoning.
    pub async fn play(
        &self,
        session: &mut QuizSession,
        user_id: &str,
        actions: &mut mpsc::Receiver<PlayerAction>,
        observer: &dyn SessionObserver,
    ) -> Result<PlayOutcome> {
        match session.state() {
            SessionState::Loading | SessionState::LoadFailed { .. } => {
                anyhow::bail!("session for '{}' is not loaded", session.quiz_id())
            }
            SessionState::Results => {
                anyhow::bail!("session for '{}' already finished", session.quiz_id())
            }
            _ => {}
        }

        let period = self.config.tick_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while !session.is_finished() {
            let events = tokio::select! {
                biased;
                action = actions.recv() => match action {
                    Some(PlayerAction::Select(option)) => session.select(option),
                    Some(PlayerAction::PowerUp(power_up)) => session.activate(power_up),
                    Some(PlayerAction::Next) => session.advance(),
                    Some(PlayerAction::Abandon) | None => {
                        tracing::info!(
                            quiz_id = %session.quiz_id(),
                            answered = session.outcomes().len(),
                            "session abandoned"
                        );
                        return Ok(PlayOutcome::Abandoned {
                            answered: session.outcomes().len(),
                        });
                    }
                },
                _ = ticker.tick() => session.tick(),
            };

            for event in &events {
                if matches!(event, SessionEvent::QuestionStarted { .. }) {
                    // fresh clock for every question
                    ticker.reset();
                }
                observer.on_event(session, event);
            }
        }

        let report = self.submit(session, user_id, observer).await;
        Ok(PlayOutcome::Completed(report))
    }

    async fn submit(
        &self,
        session: &QuizSession,
        user_id: &str,
        observer: &dyn SessionObserver,
    ) -> PlayReport {
        let summary = session.summary();
        let result = QuizResult::from_summary(&summary, user_id);

        let (saved, awarded) = futures::future::join(
            self.submitter.submit_result(&result),
            self.submitter.award_experience(user_id, summary.experience),
        )
        .await;

        let mut warnings = Vec::new();
        let result_saved = match saved {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to save result for '{}': {e:#}", summary.quiz_id);
                warnings.push(format!("result was not saved: {e}"));
                false
            }
        };
        let experience_awarded = match awarded {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to award {} XP to '{user_id}': {e:#}", summary.experience);
                warnings.push(format!("experience was not awarded: {e}"));
                false
            }
        };
        for w in &warnings {
            observer.on_warning(w);
        }

        PlayReport {
            summary,
            outcomes: session.outcomes().to_vec(),
            result_saved,
            experience_awarded,
            warnings,
        }
    }
}
