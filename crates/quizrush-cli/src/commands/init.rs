//! The `quizrush init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("quizrush.toml").exists() {
        println!("quizrush.toml already exists, skipping.");
    } else {
        std::fs::write("quizrush.toml", SAMPLE_CONFIG)?;
        println!("Created quizrush.toml");
    }

    std::fs::create_dir_all("data/quizzes")?;
    let example_path = Path::new("data/quizzes/example.toml");
    if example_path.exists() {
        println!("data/quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created data/quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizrush validate --quiz-file data/quizzes/example.toml");
    println!("  2. Run: quizrush play --quiz example");
    println!("  3. Run: quizrush leaderboard --quiz example");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizrush configuration

user_id = "${USER}"
question_time_secs = 20
countdown_secs = 3
leaderboard_size = 10

[store]
type = "file"
data_dir = "./data"

# Hosted database instead of local files:
# [store]
# type = "rest"
# base_url = "https://your-project.example.com"
# api_key = "${QUIZRUSH_API_KEY}"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "example"
title = "Example Quiz"
description = "A few warm-up questions"

[[questions]]
id = "planet"
text = "Which planet is known as the Red Planet?"
options = ["Venus", "Mars", "Jupiter", "Mercury"]
correct_answer = "Mars"
order = 1

[[questions]]
id = "ocean"
text = "What is the largest ocean on Earth?"
options = ["Atlantic", "Indian", "Arctic", "Pacific"]
correct_answer = "Pacific"
order = 2

[[questions]]
id = "boiling"
text = "At sea level, water boils at how many degrees Celsius?"
options = ["90", "100", "110", "120"]
correct_answer = "100"
order = 3
"#;
