//! quizrush CLI — play timed quizzes in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "quizrush", version, about = "Live scored quiz player")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz
    Play {
        /// Quiz id to load from the configured store
        #[arg(long)]
        quiz: String,

        /// Player name (overrides config and QUIZRUSH_USER)
        #[arg(long)]
        user: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate quiz TOML files
    Validate {
        /// Path to quiz file or directory
        #[arg(long)]
        quiz_file: PathBuf,
    },

    /// Show the best scores for a quiz
    Leaderboard {
        /// Quiz id
        #[arg(long)]
        quiz: String,

        /// Number of rows to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizrush=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play { quiz, user, config } => commands::play::execute(quiz, user, config).await,
        Commands::Validate { quiz_file } => commands::validate::execute(quiz_file),
        Commands::Leaderboard {
            quiz,
            limit,
            config,
        } => commands::leaderboard::execute(quiz, limit, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
