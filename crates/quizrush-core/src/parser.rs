//! TOML quiz parser.
//!
//! Loads quizzes from TOML files and directories, validates questions, and
//! puts them in play order.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::LoadError;
use crate::model::{Question, Quiz};

/// Intermediate TOML structure for parsing quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    text: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: String,
    #[serde(default)]
    order: Option<i64>,
}

/// Parse a single TOML file into a `Quiz`.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `Quiz` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            text: q.text,
            options: q.options,
            correct_answer: q.correct_answer,
            order: q.order,
        })
        .collect();

    Ok(Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        questions,
    })
}

/// Recursively load all `.toml` quiz files from a directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            quizzes.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz(&path) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(quizzes)
}

/// Reject a question the engine could not play safely.
pub fn validate_question(question: &Question) -> Result<(), LoadError> {
    let malformed = |reason: &str| LoadError::MalformedQuestion {
        id: question.id.clone(),
        reason: reason.to_string(),
    };

    if question.options.len() < 2 {
        return Err(malformed("needs at least 2 options"));
    }
    let distinct: HashSet<&String> = question.options.iter().collect();
    if distinct.len() != question.options.len() {
        return Err(malformed("options contain duplicates"));
    }
    if question.correct_index().is_none() {
        return Err(malformed("correct answer is not one of the options"));
    }
    Ok(())
}

/// Validate every question and put them in play order.
///
/// Questions with an ordering key come first, ascending; the rest follow in
/// the order they were loaded.
pub fn prepare_questions(quiz_id: &str, mut questions: Vec<Question>) -> Result<Vec<Question>, LoadError> {
    if questions.is_empty() {
        return Err(LoadError::Empty(quiz_id.to_string()));
    }
    for q in &questions {
        validate_question(q)?;
    }
    questions.sort_by_key(|q| (q.order.is_none(), q.order));
    Ok(questions)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz for common issues.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.questions.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions".into(),
        });
    }

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for q in &quiz.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question ID: {}", q.id),
            });
        }
    }

    for q in &quiz.questions {
        if let Err(LoadError::MalformedQuestion { reason, .. }) = validate_question(q) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: reason,
            });
        }

        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "question text is empty".into(),
            });
        }
    }

    warnings
}
