//! The `quizrush play` command.

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::sync::mpsc;

use quizrush_core::engine::{PlayEngine, PlayOutcome, PlayReport, PlayerAction, SessionObserver};
use quizrush_core::model::PowerUp;
use quizrush_core::session::{QuizSession, SessionEvent};
use quizrush_store::{create_store, load_config_from};

use super::leaderboard::leaderboard_table;

/// Prints the session as it happens.
struct ConsoleObserver;

impl ConsoleObserver {
    fn print_options(session: &QuizSession) {
        for (i, option) in session.visible_options() {
            println!("  {}. {option}", i + 1);
        }
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_event(&self, session: &QuizSession, event: &SessionEvent) {
        match event {
            SessionEvent::LoadFailed { reason } => eprintln!("  {reason}"),
            SessionEvent::CountdownStarted { from } => println!("Get ready... {from}"),
            SessionEvent::CountdownTick { remaining } if *remaining > 0 => {
                println!("{remaining}")
            }
            SessionEvent::CountdownTick { .. } => {}
            SessionEvent::QuestionStarted {
                index,
                total,
                time_limit,
            } => {
                println!("\nQuestion {}/{total} ({time_limit}s)", index + 1);
                if let Some(question) = session.current_question() {
                    println!("{}", question.text);
                }
                Self::print_options(session);
                let available: Vec<String> = session
                    .power_ups()
                    .available()
                    .into_iter()
                    .map(|p| format!("[{}] {p}", power_up_key(p)))
                    .collect();
                if !available.is_empty() {
                    println!("  power-ups: {}", available.join("  "));
                }
            }
            SessionEvent::ClockTick { remaining } => {
                if *remaining == 10 || (1..=5).contains(remaining) {
                    println!("  {remaining}s left");
                }
            }
            SessionEvent::PowerUpActivated { power_up } => println!("  {power_up} activated"),
            SessionEvent::OptionsHidden { .. } => Self::print_options(session),
            SessionEvent::AnswerLocked {
                outcome,
                correct_option,
                ..
            } => {
                let answer = session
                    .current_question()
                    .and_then(|q| q.options.get(*correct_option))
                    .map(String::as_str)
                    .unwrap_or("?");
                if outcome.correct {
                    println!("Correct! +{} points", outcome.points);
                } else if outcome.timed_out() {
                    println!("Time's up! The answer was: {answer}");
                } else {
                    println!("Wrong. The answer was: {answer}");
                }
                println!("Score: {}  (press Enter to continue)", session.score());
            }
            SessionEvent::StreakBonus { streak, multiplier } => {
                println!("{streak} in a row! x{multiplier} streak bonus")
            }
            SessionEvent::Finished(_) => println!("\nQuiz complete!"),
        }
    }

    fn on_warning(&self, message: &str) {
        eprintln!("Warning: {message}");
    }
}

fn power_up_key(power_up: PowerUp) -> char {
    match power_up {
        PowerUp::DoubleJeopardy => 'd',
        PowerUp::TimeFreeze => 't',
        PowerUp::FiftyFifty => 'f',
    }
}

/// Map one line of terminal input to a player action.
fn parse_action(line: &str) -> Option<PlayerAction> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" | "n" => Some(PlayerAction::Next),
        "q" => Some(PlayerAction::Abandon),
        "d" => Some(PlayerAction::PowerUp(PowerUp::DoubleJeopardy)),
        "t" => Some(PlayerAction::PowerUp(PowerUp::TimeFreeze)),
        "f" => Some(PlayerAction::PowerUp(PowerUp::FiftyFifty)),
        other => match other.parse::<usize>() {
            Ok(n) if n >= 1 => Some(PlayerAction::Select(n - 1)),
            _ => None,
        },
    }
}

/// Read stdin on a plain thread; the channel closes at EOF.
fn spawn_input_reader(tx: mpsc::Sender<PlayerAction>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            match parse_action(&line) {
                Some(action) => {
                    if tx.blocking_send(action).is_err() {
                        break;
                    }
                }
                None => eprintln!("  keys: option number to answer, d/t/f power-up, Enter next, q quit"),
            }
        }
    });
}

pub async fn execute(
    quiz_id: String,
    user: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(user) = user {
        config.user_id = user;
    }
    tracing::debug!(?config, "loaded config");

    let backend = create_store(&config.store)?;
    let engine = PlayEngine::new(
        backend.loader.clone(),
        backend.submitter.clone(),
        backend.leaderboard.clone(),
        config.engine_config(),
    );
    let observer = ConsoleObserver;

    let loaded = engine.load(&quiz_id, &observer).await?;
    let mut session = loaded.session;
    println!(
        "quizrush v{}: {} ({} questions) as {}",
        env!("CARGO_PKG_VERSION"),
        quiz_id,
        session.questions().len(),
        config.user_id
    );
    let you = Some(config.user_id.as_str());
    if !loaded.leaderboard.is_empty() {
        println!("{}", leaderboard_table(&loaded.leaderboard, you));
    }

    let (tx, mut rx) = mpsc::channel(16);
    spawn_input_reader(tx);

    match engine
        .play(&mut session, &config.user_id, &mut rx, &observer)
        .await?
    {
        PlayOutcome::Completed(report) => {
            print_report(&report);
            match backend
                .leaderboard
                .top_scores(&quiz_id, config.leaderboard_size)
                .await
            {
                Ok(entries) if !entries.is_empty() => {
                    println!("{}", leaderboard_table(&entries, you))
                }
                Ok(_) => {}
                Err(e) => eprintln!("Warning: leaderboard unavailable: {e}"),
            }
        }
        PlayOutcome::Abandoned { answered } => {
            println!("\nQuit after {answered} answer(s). Nothing was saved.");
        }
    }

    Ok(())
}

fn print_report(report: &PlayReport) {
    let summary = &report.summary;

    let mut table = Table::new();
    table.set_header(vec!["#", "Answer", "Result", "Time left", "Points"]);
    for (i, outcome) in report.outcomes.iter().enumerate() {
        let answer = outcome
            .selected
            .map(|s| (s + 1).to_string())
            .unwrap_or_else(|| "-".to_string());
        let result = if outcome.correct {
            "correct"
        } else if outcome.timed_out() {
            "timeout"
        } else {
            "wrong"
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(answer),
            Cell::new(result),
            Cell::new(format!("{}s", outcome.time_remaining)),
            Cell::new(outcome.points),
        ]);
    }
    println!("{table}");

    let mut totals = Table::new();
    totals.set_header(vec!["Score", "Correct", "Best streak", "XP", "Saved"]);
    totals.add_row(vec![
        Cell::new(summary.total_score),
        Cell::new(format!(
            "{}/{}",
            summary.correct_count, summary.total_questions
        )),
        Cell::new(summary.best_streak),
        Cell::new(format!("+{}", summary.experience)),
        Cell::new(if report.result_saved && report.experience_awarded {
            "yes"
        } else {
            "no"
        }),
    ]);
    println!("{totals}");
}
