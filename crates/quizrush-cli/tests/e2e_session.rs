//! End-to-end play-throughs: engine + in-memory store on a paused clock.

use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;

use quizrush_core::engine::{
    PlayEngine, PlayEngineConfig, PlayOutcome, PlayerAction, SessionObserver,
};
use quizrush_core::model::{PowerUp, Question, Quiz};
use quizrush_core::session::{QuizSession, SessionEvent, SessionState};
use quizrush_store::MemoryStore;

fn quiz(id: &str, n: usize) -> Quiz {
    Quiz {
        id: id.into(),
        title: "Test Quiz".into(),
        description: String::new(),
        questions: (1..=n)
            .map(|i| Question {
                id: format!("q{i}"),
                text: format!("Question {i}?"),
                options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                correct_answer: "A".into(),
                order: Some(i as i64),
            })
            .collect(),
    }
}

fn engine(store: Arc<MemoryStore>) -> PlayEngine {
    PlayEngine::new(
        store.clone(),
        store.clone(),
        store,
        PlayEngineConfig::default(),
    )
}

/// Forwards events to a channel and checks session invariants on each one.
struct CheckingObserver(mpsc::UnboundedSender<SessionEvent>);

impl SessionObserver for CheckingObserver {
    fn on_event(&self, session: &QuizSession, event: &SessionEvent) {
        if matches!(
            session.state(),
            SessionState::Playing | SessionState::Feedback | SessionState::Results
        ) {
            assert_eq!(session.current_index(), session.outcomes().len());
            let points: u64 = session.outcomes().iter().map(|o| o.points).sum();
            assert_eq!(session.score(), points);
        }
        let _ = self.0.send(event.clone());
    }
}

#[tokio::test(start_paused = true)]
async fn scripted_play_through_scores_5750() {
    let store = Arc::new(MemoryStore::with_quizzes([quiz("trivia", 5)]));
    let engine = engine(store.clone());
    let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();
    let observer = CheckingObserver(ev_tx);

    let mut loaded = engine.load("trivia", &observer).await.unwrap();
    assert!(loaded.leaderboard.is_empty());

    let (tx, mut rx) = mpsc::channel(8);
    let bot = tokio::spawn(async move {
        let mut question = 0;
        while let Some(event) = ev_rx.recv().await {
            let action = match event {
                SessionEvent::QuestionStarted { index, .. } => {
                    question = index;
                    match index {
                        0 | 2 => PlayerAction::Select(0),
                        3 => PlayerAction::Select(1),
                        // Q2 waits for the clock, Q5 lets it run out
                        _ => continue,
                    }
                }
                SessionEvent::ClockTick { remaining: 10 } if question == 1 => {
                    PlayerAction::Select(0)
                }
                SessionEvent::AnswerLocked { .. } => PlayerAction::Next,
                SessionEvent::Finished(_) => break,
                _ => continue,
            };
            if tx.send(action).await.is_err() {
                break;
            }
        }
    });

    let outcome = engine
        .play(&mut loaded.session, "ana", &mut rx, &observer)
        .await
        .unwrap();
    bot.await.unwrap();

    let PlayOutcome::Completed(report) = outcome else {
        panic!("expected completion");
    };
    assert_eq!(report.summary.total_score, 5750);
    assert_eq!(report.summary.correct_count, 3);
    assert_eq!(report.summary.total_questions, 5);
    assert_eq!(report.summary.best_streak, 3);
    assert_eq!(report.summary.experience, 73);

    let points: Vec<u64> = report.outcomes.iter().map(|o| o.points).collect();
    assert_eq!(points, vec![1500, 1250, 3000, 0, 0]);
    assert_eq!(report.outcomes[1].time_remaining, 10);
    assert!(report.outcomes[4].timed_out());
    assert!(report.result_saved && report.experience_awarded);

    let results = store.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 5750);
    assert_eq!(results[0].session_id, report.summary.session_id);
    assert!(results[0].completed_at <= Utc::now());
    assert_eq!(store.experience_of("ana"), 73);
    assert_eq!(store.submit_calls(), 1);
    assert_eq!(store.award_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn leaderboard_reflects_previous_runs() {
    let store = Arc::new(MemoryStore::with_quizzes([quiz("trivia", 2)]));
    let engine = engine(store.clone());

    for user in ["ana", "bo"] {
        let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();
        let observer = CheckingObserver(ev_tx);
        let mut loaded = engine.load("trivia", &observer).await.unwrap();
        let (tx, mut rx) = mpsc::channel(8);
        // bo answers wrong on the first question
        let first = if user == "bo" { 1 } else { 0 };
        let bot = tokio::spawn(async move {
            while let Some(event) = ev_rx.recv().await {
                let action = match event {
                    SessionEvent::QuestionStarted { index: 0, .. } => PlayerAction::Select(first),
                    SessionEvent::QuestionStarted { .. } => PlayerAction::Select(0),
                    SessionEvent::AnswerLocked { .. } => PlayerAction::Next,
                    SessionEvent::Finished(_) => break,
                    _ => continue,
                };
                if tx.send(action).await.is_err() {
                    break;
                }
            }
        });
        engine
            .play(&mut loaded.session, user, &mut rx, &observer)
            .await
            .unwrap();
        bot.await.unwrap();
    }

    let loaded = engine
        .load("trivia", &quizrush_core::engine::NoopObserver)
        .await
        .unwrap();
    let names: Vec<&str> = loaded
        .leaderboard
        .iter()
        .map(|e| e.display_name.as_str())
        .collect();
    assert_eq!(names, vec!["ana", "bo"]);
    assert_eq!(loaded.leaderboard[0].score, 3000);
    assert_eq!(loaded.leaderboard[1].score, 1500);
}

#[tokio::test(start_paused = true)]
async fn random_play_keeps_score_consistent() {
    for seed in 0..8u64 {
        let store = Arc::new(MemoryStore::with_quizzes([quiz("trivia", 6)]));
        let engine = engine(store.clone());
        let (ev_tx, mut ev_rx) = mpsc::unbounded_channel();
        let observer = CheckingObserver(ev_tx);
        let mut loaded = engine.load("trivia", &observer).await.unwrap();

        let (tx, mut rx) = mpsc::channel(8);
        let bot = tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut hidden: Vec<usize> = Vec::new();
            while let Some(event) = ev_rx.recv().await {
                let mut actions = Vec::new();
                if matches!(event, SessionEvent::QuestionStarted { .. }) {
                    hidden.clear();
                }
                match event {
                    SessionEvent::QuestionStarted { .. } | SessionEvent::ClockTick { .. } => {
                        if rng.gen_bool(0.2) {
                            let p = PowerUp::ALL[rng.gen_range(0..PowerUp::ALL.len())];
                            actions.push(PlayerAction::PowerUp(p));
                        }
                        if rng.gen_bool(0.3) {
                            actions.push(PlayerAction::Select(rng.gen_range(0..5)));
                        }
                    }
                    SessionEvent::OptionsHidden { options } => hidden = options,
                    // a frozen clock never expires, so answer with something playable
                    SessionEvent::PowerUpActivated {
                        power_up: PowerUp::TimeFreeze,
                    } => {
                        let visible = (0..4).find(|i| !hidden.contains(i)).unwrap_or(0);
                        actions.push(PlayerAction::Select(visible));
                    }
                    SessionEvent::AnswerLocked { .. } => actions.push(PlayerAction::Next),
                    SessionEvent::Finished(_) => break,
                    _ => {}
                }
                for action in actions {
                    if tx.send(action).await.is_err() {
                        return;
                    }
                }
            }
        });

        let outcome = engine
            .play(&mut loaded.session, "rng", &mut rx, &observer)
            .await
            .unwrap();
        bot.await.unwrap();

        let PlayOutcome::Completed(report) = outcome else {
            panic!("seed {seed}: expected completion");
        };
        let points: u64 = report.outcomes.iter().map(|o| o.points).sum();
        assert_eq!(report.summary.total_score, points, "seed {seed}");
        assert_eq!(report.outcomes.len(), 6, "seed {seed}");
        assert_eq!(
            report.summary.correct_count,
            report.outcomes.iter().filter(|o| o.correct).count()
        );
        for o in &report.outcomes {
            if !o.correct {
                assert_eq!(o.points, 0, "seed {seed}");
            }
            assert!(o.time_remaining <= 20);
        }
        assert_eq!(store.results().len(), 1);
    }
}
