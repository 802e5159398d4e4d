//! The `quizrush leaderboard` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizrush_core::model::LeaderboardEntry;
use quizrush_store::{create_store, load_config_from};

pub async fn execute(quiz_id: String, limit: usize, config_path: Option<PathBuf>) -> Result<()> {
    anyhow::ensure!(limit >= 1, "limit must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let backend = create_store(&config.store)?;

    let entries = backend.leaderboard.top_scores(&quiz_id, limit).await?;
    if entries.is_empty() {
        println!("No scores yet for '{quiz_id}'.");
        return Ok(());
    }

    println!("Leaderboard: {quiz_id}");
    println!("{}", leaderboard_table(&entries, None));
    Ok(())
}

/// Ranked table, marking `highlight`'s row if present.
pub fn leaderboard_table(entries: &[LeaderboardEntry], highlight: Option<&str>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["#", "Player", "Score"]);
    for (rank, entry) in entries.iter().enumerate() {
        let name = match highlight {
            Some(user) if user == entry.display_name => format!("{} (you)", entry.display_name),
            _ => entry.display_name.clone(),
        };
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(name),
            Cell::new(entry.score),
        ]);
    }
    table
}
