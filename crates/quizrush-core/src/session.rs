//! The play-session state machine.
//!
//! `QuizSession` is a plain value driven by three kinds of input: clock ticks,
//! player actions and the one-off load result. It never sleeps or spawns;
//! `engine::PlayEngine` owns the timer and feeds it ticks. Every operation
//! returns the events it produced so callers can render or play cues.
//!
//! ```text
//! Loading -> Countdown -> Playing -> Feedback -> Playing ... -> Results
//!    \-> LoadFailed
//! ```

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{ClockTick, Countdown, SessionClock, COUNTDOWN_SECS};
use crate::error::LoadError;
use crate::model::{AnswerOutcome, PowerUp, Question};
use crate::parser::prepare_questions;
use crate::powerups::PowerUpBank;
use crate::scoring::{ScoreInput, ScoringRules};
use crate::streak::{StreakTracker, STREAK_CUE_THRESHOLD};

/// Lifecycle of one play-through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for the question set.
    Loading,
    /// The question set could not be loaded. Terminal.
    LoadFailed { reason: String },
    /// Priming tick-down before the first question.
    Countdown { remaining: u32 },
    /// A question is on the clock and unanswered.
    Playing,
    /// An answer is locked in; showing the correct option.
    Feedback,
    /// Every question answered. Terminal until `reset`.
    Results,
}

/// Something that happened, for presentation and cue triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    LoadFailed {
        reason: String,
    },
    CountdownStarted {
        from: u32,
    },
    CountdownTick {
        remaining: u32,
    },
    QuestionStarted {
        index: usize,
        total: usize,
        time_limit: u32,
    },
    ClockTick {
        remaining: u32,
    },
    PowerUpActivated {
        power_up: PowerUp,
    },
    OptionsHidden {
        options: Vec<usize>,
    },
    AnswerLocked {
        index: usize,
        outcome: AnswerOutcome,
        correct_option: usize,
    },
    /// A correct answer that kept a streak of three or more going.
    StreakBonus {
        streak: u32,
        multiplier: u64,
    },
    Finished(SessionSummary),
}

/// Final numbers for a completed play-through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub quiz_id: String,
    pub total_score: u64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub best_streak: u32,
    /// Experience earned for this play-through.
    pub experience: u64,
}

/// One in-memory play-through of a quiz.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    quiz_id: String,
    rules: ScoringRules,
    countdown_secs: u32,
    questions: Vec<Question>,
    state: SessionState,
    countdown: Countdown,
    clock: SessionClock,
    score: u64,
    streak: StreakTracker,
    power_ups: PowerUpBank,
    outcomes: Vec<AnswerOutcome>,
    rng: StdRng,
}

impl QuizSession {
    pub fn new(quiz_id: impl Into<String>, rules: ScoringRules) -> Self {
        let mut clock = SessionClock::start(rules.question_time);
        clock.stop();
        Self {
            id: Uuid::new_v4(),
            quiz_id: quiz_id.into(),
            rules,
            countdown_secs: COUNTDOWN_SECS,
            questions: Vec::new(),
            state: SessionState::Loading,
            countdown: Countdown::new(COUNTDOWN_SECS),
            clock,
            score: 0,
            streak: StreakTracker::new(),
            power_ups: PowerUpBank::new(),
            outcomes: Vec::new(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Override the length of the pre-game tick-down.
    pub fn with_countdown(mut self, secs: u32) -> Self {
        self.countdown_secs = secs;
        self
    }

    /// Seed the fifty-fifty random source (tests and replays).
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Hand the loaded question set to the session. Valid only in `Loading`.
    ///
    /// An empty set or a malformed question moves the session to
    /// `LoadFailed` and never into `Countdown`.
    pub fn begin(&mut self, questions: Vec<Question>) -> Result<Vec<SessionEvent>, LoadError> {
        if self.state != SessionState::Loading {
            tracing::debug!(state = ?self.state, "ignoring question set outside Loading");
            return Ok(Vec::new());
        }
        match prepare_questions(&self.quiz_id, questions) {
            Ok(questions) => {
                tracing::info!(
                    quiz_id = %self.quiz_id,
                    questions = questions.len(),
                    "quiz loaded"
                );
                self.questions = questions;
                Ok(self.start_countdown())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Record that the question set could not be loaded.
    pub fn fail(&mut self, error: &LoadError) -> Vec<SessionEvent> {
        if self.state != SessionState::Loading {
            return Vec::new();
        }
        tracing::error!(quiz_id = %self.quiz_id, "{error}");
        let reason = error.to_string();
        self.state = SessionState::LoadFailed {
            reason: reason.clone(),
        };
        vec![SessionEvent::LoadFailed { reason }]
    }

    /// Advance the countdown or the question clock by one unit.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        match self.state {
            SessionState::Countdown { .. } => {
                let remaining = self.countdown.tick();
                let mut events = vec![SessionEvent::CountdownTick { remaining }];
                if remaining == 0 {
                    events.extend(self.start_question());
                } else {
                    self.state = SessionState::Countdown { remaining };
                }
                events
            }
            SessionState::Playing => match self.clock.tick() {
                ClockTick::Ticked(remaining) => vec![SessionEvent::ClockTick { remaining }],
                ClockTick::Expired => {
                    let mut events = vec![SessionEvent::ClockTick { remaining: 0 }];
                    events.extend(self.lock_answer(None));
                    events
                }
                ClockTick::Idle => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Lock in `option` for the current question.
    ///
    /// Ignored outside `Playing` (a stale input after the answer was locked),
    /// for out-of-range indices, and for options hidden by fifty-fifty.
    pub fn select(&mut self, option: usize) -> Vec<SessionEvent> {
        if self.state != SessionState::Playing {
            tracing::debug!(state = ?self.state, option, "ignoring selection");
            return Vec::new();
        }
        let question = &self.questions[self.outcomes.len()];
        if option >= question.options.len() || self.power_ups.hidden_options().contains(&option) {
            tracing::debug!(option, "ignoring selection of unavailable option");
            return Vec::new();
        }
        self.lock_answer(Some(option))
    }

    /// Spend a power-up on the current question. Silently does nothing if it
    /// was already used or no question is being timed.
    pub fn activate(&mut self, power_up: PowerUp) -> Vec<SessionEvent> {
        if self.state != SessionState::Playing || self.clock.is_stopped() {
            tracing::debug!(%power_up, state = ?self.state, "ignoring power-up outside Playing");
            return Vec::new();
        }
        let question = &self.questions[self.outcomes.len()];
        if !self.power_ups.consume(power_up, question, &mut self.rng) {
            tracing::debug!(%power_up, "power-up already used");
            return Vec::new();
        }

        let mut events = vec![SessionEvent::PowerUpActivated { power_up }];
        match power_up {
            PowerUp::TimeFreeze => {
                self.clock.freeze();
            }
            PowerUp::FiftyFifty => events.push(SessionEvent::OptionsHidden {
                options: self.power_ups.hidden_options().iter().copied().collect(),
            }),
            PowerUp::DoubleJeopardy => {}
        }
        events
    }

    /// Leave `Feedback`: start the next question, or finish.
    pub fn advance(&mut self) -> Vec<SessionEvent> {
        if self.state != SessionState::Feedback {
            return Vec::new();
        }
        if self.outcomes.len() < self.questions.len() {
            return self.start_question();
        }

        self.power_ups.clear_question_effects();
        self.state = SessionState::Results;
        let summary = self.summary();
        tracing::info!(
            quiz_id = %self.quiz_id,
            score = summary.total_score,
            correct = summary.correct_count,
            best_streak = summary.best_streak,
            "session complete"
        );
        vec![SessionEvent::Finished(summary)]
    }

    /// Start over with the same questions and all per-session state zeroed.
    pub fn reset(&mut self) -> Vec<SessionEvent> {
        if matches!(
            self.state,
            SessionState::Loading | SessionState::LoadFailed { .. }
        ) {
            return Vec::new();
        }
        self.id = Uuid::new_v4();
        self.score = 0;
        self.streak.reset();
        self.power_ups.reset();
        self.outcomes.clear();
        self.clock.stop();
        self.start_countdown()
    }

    fn start_countdown(&mut self) -> Vec<SessionEvent> {
        self.countdown = Countdown::new(self.countdown_secs);
        let mut events = vec![SessionEvent::CountdownStarted {
            from: self.countdown_secs,
        }];
        if self.countdown.is_done() {
            events.extend(self.start_question());
        } else {
            self.state = SessionState::Countdown {
                remaining: self.countdown.remaining(),
            };
        }
        events
    }

    fn start_question(&mut self) -> Vec<SessionEvent> {
        self.power_ups.clear_question_effects();
        self.clock = SessionClock::start(self.rules.question_time);
        self.state = SessionState::Playing;
        vec![SessionEvent::QuestionStarted {
            index: self.outcomes.len(),
            total: self.questions.len(),
            time_limit: self.rules.question_time,
        }]
    }

    /// Stop the clock, score the answer as of now and record its outcome.
    fn lock_answer(&mut self, selected: Option<usize>) -> Vec<SessionEvent> {
        self.clock.stop();

        let index = self.outcomes.len();
        let question = &self.questions[index];
        let correct = selected.is_some_and(|o| question.is_correct(o));
        let time_remaining = self.clock.remaining();
        let streak = self.streak.record(correct);
        let breakdown = self.rules.score_answer(ScoreInput {
            correct,
            time_remaining,
            double_jeopardy: self.power_ups.double_jeopardy_active(),
            streak_after: streak,
        });
        self.score += breakdown.total;

        let outcome = AnswerOutcome {
            question_id: question.id.clone(),
            selected,
            correct,
            time_remaining,
            time_bonus: breakdown.time_bonus,
            points: breakdown.total,
            streak,
        };
        let correct_option = question.correct_index().unwrap_or_default();
        tracing::debug!(index, correct, points = breakdown.total, streak, "answer locked");

        self.outcomes.push(outcome.clone());
        self.state = SessionState::Feedback;

        let mut events = vec![SessionEvent::AnswerLocked {
            index,
            outcome,
            correct_option,
        }];
        if correct && streak >= STREAK_CUE_THRESHOLD {
            events.push(SessionEvent::StreakBonus {
                streak,
                multiplier: breakdown.streak_multiplier,
            });
        }
        events
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    pub fn rules(&self) -> &ScoringRules {
        &self.rules
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions whose answer is locked in. This is the index of
    /// the question on the clock while `Playing`.
    pub fn current_index(&self) -> usize {
        self.outcomes.len()
    }

    /// The question being played, or under review during `Feedback`.
    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            SessionState::Playing => self.questions.get(self.outcomes.len()),
            SessionState::Feedback => self
                .outcomes
                .len()
                .checked_sub(1)
                .and_then(|i| self.questions.get(i)),
            _ => None,
        }
    }

    /// Options of the current question not hidden by fifty-fifty.
    pub fn visible_options(&self) -> Vec<(usize, &str)> {
        let hidden = self.power_ups.hidden_options();
        self.current_question()
            .map(|q| {
                q.options
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !hidden.contains(i))
                    .map(|(i, o)| (i, o.as_str()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn hidden_options(&self) -> Vec<usize> {
        self.power_ups.hidden_options().iter().copied().collect()
    }

    /// Clock value while a question is on screen.
    pub fn time_remaining(&self) -> Option<u32> {
        match self.state {
            SessionState::Playing | SessionState::Feedback => Some(self.clock.remaining()),
            _ => None,
        }
    }

    pub fn is_clock_frozen(&self) -> bool {
        self.clock.is_frozen()
    }

    pub fn double_jeopardy_active(&self) -> bool {
        self.power_ups.double_jeopardy_active()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn current_streak(&self) -> u32 {
        self.streak.current()
    }

    pub fn best_streak(&self) -> u32 {
        self.streak.best()
    }

    pub fn outcomes(&self) -> &[AnswerOutcome] {
        &self.outcomes
    }

    pub fn last_outcome(&self) -> Option<&AnswerOutcome> {
        self.outcomes.last()
    }

    pub fn correct_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.correct).count()
    }

    pub fn power_ups(&self) -> &PowerUpBank {
        &self.power_ups
    }

    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Results
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            quiz_id: self.quiz_id.clone(),
            total_score: self.score,
            correct_count: self.correct_count(),
            total_questions: self.questions.len(),
            best_streak: self.streak.best(),
            experience: self.rules.experience_reward(self.score, self.streak.best()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    /// A session past the countdown, on question 0.
    fn playing(n: usize) -> QuizSession {
        let mut s = QuizSession::new("quiz", ScoringRules::default()).with_rng_seed(11);
        s.begin(fixtures::questions(n)).unwrap();
        for _ in 0..COUNTDOWN_SECS {
            s.tick();
        }
        assert_eq!(s.state(), &SessionState::Playing);
        s
    }

    fn tick_n(s: &mut QuizSession, n: u32) {
        for _ in 0..n {
            s.tick();
        }
    }

    #[derive(Debug, PartialEq)]
    struct Fingerprint {
        state: SessionState,
        index: usize,
        score: u64,
        streak: (u32, u32),
        power_ups: PowerUpBank,
        outcomes: Vec<AnswerOutcome>,
        remaining: Option<u32>,
        frozen: bool,
    }

    fn fingerprint(s: &QuizSession) -> Fingerprint {
        Fingerprint {
            state: s.state().clone(),
            index: s.current_index(),
            score: s.score(),
            streak: (s.current_streak(), s.best_streak()),
            power_ups: s.power_ups().clone(),
            outcomes: s.outcomes().to_vec(),
            remaining: s.time_remaining(),
            frozen: s.is_clock_frozen(),
        }
    }

    #[test]
    fn countdown_runs_three_ticks_then_plays() {
        let mut s = QuizSession::new("quiz", ScoringRules::default());
        let events = s.begin(fixtures::questions(2)).unwrap();
        assert_eq!(events, vec![SessionEvent::CountdownStarted { from: 3 }]);
        assert_eq!(s.state(), &SessionState::Countdown { remaining: 3 });

        assert_eq!(s.tick(), vec![SessionEvent::CountdownTick { remaining: 2 }]);
        assert_eq!(s.tick(), vec![SessionEvent::CountdownTick { remaining: 1 }]);
        assert!(s.select(0).is_empty());
        let events = s.tick();
        assert_eq!(
            events,
            vec![
                SessionEvent::CountdownTick { remaining: 0 },
                SessionEvent::QuestionStarted {
                    index: 0,
                    total: 2,
                    time_limit: 20
                }
            ]
        );
        assert_eq!(s.time_remaining(), Some(20));
    }

    #[test]
    fn zero_countdown_starts_immediately() {
        let mut s = QuizSession::new("quiz", ScoringRules::default()).with_countdown(0);
        s.begin(fixtures::questions(1)).unwrap();
        assert_eq!(s.state(), &SessionState::Playing);
    }

    #[test]
    fn empty_question_set_fails_load() {
        let mut s = QuizSession::new("empty", ScoringRules::default());
        let err = s.begin(vec![]).unwrap_err();
        assert_eq!(err, LoadError::Empty("empty".into()));
        assert!(matches!(s.state(), SessionState::LoadFailed { .. }));
        assert!(s.tick().is_empty());
        assert!(s.reset().is_empty());
    }

    #[test]
    fn malformed_question_fails_load() {
        let mut bad = fixtures::question("bad", 0);
        bad.correct_answer = "Z".into();
        let mut s = QuizSession::new("quiz", ScoringRules::default());
        assert!(s.begin(vec![fixtures::question("ok", 0), bad]).is_err());
        assert!(matches!(s.state(), SessionState::LoadFailed { .. }));
    }

    #[test]
    fn repeated_correct_answer_fails_load() {
        let mut repeat = fixtures::question("repeat", 0);
        repeat.options = vec!["A".into(), "B".into(), "A".into()];
        let mut s = QuizSession::new("quiz", ScoringRules::default());
        let err = s.begin(vec![repeat]).unwrap_err();
        assert!(matches!(err, LoadError::MalformedQuestion { ref id, .. } if id == "repeat"));
        assert!(matches!(s.state(), SessionState::LoadFailed { .. }));
        assert!(s.activate(PowerUp::FiftyFifty).is_empty());
    }

    #[test]
    fn end_to_end_scoring_scenario() {
        let mut s = playing(5);

        // Q1 correct at full time
        s.select(0);
        assert_eq!(s.score(), 1500);
        assert_eq!(s.current_streak(), 1);
        s.advance();

        // Q2 correct at 10 left
        tick_n(&mut s, 10);
        assert_eq!(s.time_remaining(), Some(10));
        s.select(0);
        assert_eq!(s.score(), 2750);
        s.advance();

        // Q3 correct at full time, third in a row
        let events = s.select(0);
        assert!(events.contains(&SessionEvent::StreakBonus {
            streak: 3,
            multiplier: 2
        }));
        assert_eq!(s.score(), 5750);
        s.advance();

        // Q4 wrong
        s.select(1);
        assert_eq!(s.score(), 5750);
        assert_eq!(s.current_streak(), 0);
        s.advance();

        // Q5 timeout
        tick_n(&mut s, 20);
        assert_eq!(s.state(), &SessionState::Feedback);
        assert!(s.last_outcome().unwrap().timed_out());
        let events = s.advance();

        assert_eq!(s.state(), &SessionState::Results);
        let summary = s.summary();
        assert_eq!(summary.total_score, 5750);
        assert_eq!(summary.correct_count, 3);
        assert_eq!(summary.total_questions, 5);
        assert_eq!(summary.best_streak, 3);
        assert_eq!(summary.experience, 58 + 15);
        assert_eq!(events, vec![SessionEvent::Finished(summary)]);
    }

    #[test]
    fn outcome_count_tracks_index() {
        let mut s = playing(4);
        for (i, choice) in [0, 1, 0].into_iter().enumerate() {
            assert_eq!(s.outcomes().len(), s.current_index());
            s.select(choice);
            assert_eq!(s.outcomes().len(), i + 1);
            assert_eq!(s.outcomes().len(), s.current_index());
            s.advance();
        }
        tick_n(&mut s, 25);
        assert_eq!(s.outcomes().len(), s.current_index());
        s.advance();
        assert!(s.is_finished());
        assert_eq!(s.outcomes().len(), 4);
        assert_eq!(s.current_index(), 4);
    }

    #[test]
    fn timeout_resets_streak_and_scores_zero() {
        let mut s = playing(3);
        s.select(0);
        s.advance();
        s.select(0);
        s.advance();
        assert_eq!(s.current_streak(), 2);

        let events = s.activate(PowerUp::DoubleJeopardy);
        assert_eq!(events.len(), 1);
        tick_n(&mut s, 20);
        let outcome = s.last_outcome().unwrap();
        assert_eq!(outcome.points, 0);
        assert_eq!(outcome.selected, None);
        assert!(!outcome.correct);
        assert_eq!(s.current_streak(), 0);
        assert_eq!(s.best_streak(), 2);
    }

    #[test]
    fn selection_after_lock_is_ignored() {
        let mut s = playing(2);
        s.select(0);
        let before = fingerprint(&s);
        assert!(s.select(1).is_empty());
        assert!(s.select(0).is_empty());
        assert!(s.tick().is_empty());
        assert_eq!(fingerprint(&s), before);
        assert_eq!(s.outcomes().len(), 1);
    }

    #[test]
    fn tick_after_selection_cannot_double_submit() {
        let mut s = playing(2);
        tick_n(&mut s, 19);
        assert_eq!(s.time_remaining(), Some(1));
        s.select(0);
        tick_n(&mut s, 5);
        assert_eq!(s.outcomes().len(), 1);
        assert!(s.last_outcome().unwrap().correct);
        assert_eq!(s.last_outcome().unwrap().time_remaining, 1);
    }

    #[test]
    fn out_of_range_selection_is_ignored() {
        let mut s = playing(1);
        assert!(s.select(9).is_empty());
        assert_eq!(s.state(), &SessionState::Playing);
    }

    #[test]
    fn used_power_up_is_idempotent() {
        let mut s = playing(3);
        for p in PowerUp::ALL {
            assert!(!s.activate(p).is_empty());
            let before = fingerprint(&s);
            assert!(s.activate(p).is_empty());
            assert_eq!(fingerprint(&s), before);
        }

        s.select(0);
        s.advance();
        for p in PowerUp::ALL {
            let before = fingerprint(&s);
            assert!(s.activate(p).is_empty());
            assert_eq!(fingerprint(&s), before);
        }
    }

    #[test]
    fn power_ups_rejected_outside_playing() {
        let mut s = QuizSession::new("quiz", ScoringRules::default());
        assert!(s.activate(PowerUp::TimeFreeze).is_empty());
        s.begin(fixtures::questions(2)).unwrap();
        assert!(s.activate(PowerUp::TimeFreeze).is_empty());
        tick_n(&mut s, 3);
        s.select(0);
        assert!(s.activate(PowerUp::DoubleJeopardy).is_empty());
        assert!(!s.power_ups().is_used(PowerUp::DoubleJeopardy));
    }

    #[test]
    fn double_jeopardy_applies_to_one_question_only() {
        let mut s = playing(2);
        s.activate(PowerUp::DoubleJeopardy);
        assert!(s.double_jeopardy_active());
        s.select(0);
        assert_eq!(s.score(), 3000);
        s.advance();
        assert!(!s.double_jeopardy_active());
        s.select(0);
        assert_eq!(s.score(), 4500);
    }

    #[test]
    fn time_freeze_halts_clock_until_next_question() {
        let mut s = playing(2);
        tick_n(&mut s, 4);
        s.activate(PowerUp::TimeFreeze);
        tick_n(&mut s, 60);
        assert_eq!(s.state(), &SessionState::Playing);
        assert_eq!(s.time_remaining(), Some(16));

        s.select(0);
        assert_eq!(s.last_outcome().unwrap().time_bonus, 400);
        s.advance();
        assert!(!s.is_clock_frozen());
        tick_n(&mut s, 1);
        assert_eq!(s.time_remaining(), Some(19));
    }

    #[test]
    fn fifty_fifty_hides_two_wrong_options_for_one_question() {
        let mut s = playing(2);
        let events = s.activate(PowerUp::FiftyFifty);
        let hidden = s.hidden_options();
        assert_eq!(hidden.len(), 2);
        assert!(!hidden.contains(&0));
        assert!(events.contains(&SessionEvent::OptionsHidden {
            options: hidden.clone()
        }));
        assert_eq!(s.visible_options().len(), 2);

        // hidden options cannot be picked
        assert!(s.select(hidden[0]).is_empty());
        s.select(0);
        s.advance();
        assert!(s.hidden_options().is_empty());
        assert_eq!(s.visible_options().len(), 4);
    }

    #[test]
    fn best_streak_never_decreases() {
        let mut s = playing(8);
        let mut last_best = 0;
        for choice in [0, 0, 1, 0, 0, 0, 1, 0] {
            s.select(choice);
            assert!(s.best_streak() >= last_best);
            assert!(s.best_streak() >= s.current_streak());
            last_best = s.best_streak();
            s.advance();
        }
        assert_eq!(s.best_streak(), 3);
    }

    #[test]
    fn reset_zeroes_session_and_restarts_countdown() {
        let mut s = playing(2);
        s.activate(PowerUp::FiftyFifty);
        s.select(0);
        s.advance();
        s.select(0);
        s.advance();
        assert!(s.is_finished());
        let first_id = s.id();

        let events = s.reset();
        assert_eq!(events, vec![SessionEvent::CountdownStarted { from: 3 }]);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best_streak(), 0);
        assert!(s.outcomes().is_empty());
        assert_eq!(s.power_ups().available().len(), 3);
        assert_ne!(s.id(), first_id);
        assert_eq!(s.questions().len(), 2);
    }

    #[test]
    fn current_question_follows_feedback() {
        let mut s = playing(2);
        assert_eq!(s.current_question().unwrap().id, "q1");
        s.select(0);
        assert_eq!(s.current_question().unwrap().id, "q1");
        s.advance();
        assert_eq!(s.current_question().unwrap().id, "q2");
    }
}
