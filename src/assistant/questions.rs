//! Parsing of suggested questions out of free-form model output

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

/// Number of suggested questions handed to the chat UI
pub const QUESTION_COUNT: usize = 5;

/// Questions offered when the model is unavailable or its reply is unusable
pub const DEFAULT_QUESTIONS: [&str; QUESTION_COUNT] = [
    "How is my personal data used?",
    "Can I delete my account?",
    "How do they share my information?",
    "What rights do I have?",
    "How can I opt out of data collection?",
];

static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```json\s*").expect("fence pattern is valid"));
static PLAIN_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*").expect("fence pattern is valid"));
static LINE_NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^["\s\d.\[\]\-*]+|["\s,\]\[]+$"#).expect("line pattern is valid")
});

/// The default questions as owned strings
pub fn default_questions() -> Vec<String> {
    DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect()
}

/// Turn a model reply into exactly `QUESTION_COUNT` questions.
///
/// The reply is read as a JSON array of strings (markdown code fences removed first).
/// If it is not valid JSON, lines ending in `?` are picked out instead. Missing
/// questions are filled from `DEFAULT_QUESTIONS`.
pub fn parse_questions(reply: &str) -> Vec<String> {
    let cleaned = strip_code_fences(reply);

    let parsed = match serde_json::from_str::<serde_json::Value>(&cleaned) {
        Ok(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .take(QUESTION_COUNT)
            .collect(),
        Ok(other) => {
            debug!("Questions reply was JSON but not an array: {}", other);
            Vec::new()
        }
        Err(e) => {
            warn!("Failed to parse questions JSON: {}", e);
            questions_from_lines(&cleaned)
        }
    };

    fill_with_defaults(parsed)
}

fn strip_code_fences(reply: &str) -> String {
    let trimmed = reply.trim();
    if !trimmed.contains("```") {
        return trimmed.to_string();
    }
    let without_json = JSON_FENCE.replace_all(trimmed, "");
    PLAIN_FENCE.replace_all(&without_json, "").trim().to_string()
}

fn questions_from_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| LINE_NOISE.replace_all(line, "").trim().to_string())
        .filter(|line| line.ends_with('?') && line.chars().count() > 10)
        .take(QUESTION_COUNT)
        .collect()
}

fn fill_with_defaults(mut questions: Vec<String>) -> Vec<String> {
    for default in DEFAULT_QUESTIONS {
        if questions.len() >= QUESTION_COUNT {
            break;
        }
        if !questions.iter().any(|q| q == default) {
            questions.push(default.to_string());
        }
    }
    questions
}
