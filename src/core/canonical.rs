//! Canonical difficulty, duration and topic values for a LabSpec.

use crate::core::coerce::{as_finite_number, to_string_array, unique_strings};
use crate::core::lab::Difficulty;
use serde_json::Value;

pub const DEFAULT_DURATION_MINUTES: u32 = 45;
pub const MIN_DURATION_MINUTES: u32 = 10;
pub const MAX_DURATION_MINUTES: u32 = 240;
pub const MAX_TOPICS: usize = 8;
pub const FALLBACK_TOPIC: &str = "Practice";

/// Goal keywords and the topic each one implies. Multi-word keywords are
/// matched as phrases, single words against whole goal tokens (a plain `s`
/// or `es` plural also matches).
const TOPIC_VOCABULARY: &[(&str, &str)] = &[
    ("array", "Arrays"),
    ("list", "Lists"),
    ("loop", "Loops"),
    ("iteration", "Loops"),
    ("recursion", "Recursion"),
    ("recursive", "Recursion"),
    ("function", "Functions"),
    ("class", "Object-Oriented Programming"),
    ("object", "Object-Oriented Programming"),
    ("inheritance", "Object-Oriented Programming"),
    ("string", "Strings"),
    ("sort", "Sorting"),
    ("sorting", "Sorting"),
    ("search", "Searching"),
    ("searching", "Searching"),
    ("hash", "Hash Tables"),
    ("dictionary", "Hash Tables"),
    ("tree", "Trees"),
    ("graph", "Graphs"),
    ("linked list", "Linked Lists"),
    ("dynamic programming", "Dynamic Programming"),
    ("algorithm", "Algorithms"),
    ("complexity", "Algorithms"),
    ("sql", "Databases"),
    ("database", "Databases"),
    ("api", "APIs"),
    ("data", "Data Analysis"),
    ("dataset", "Data Analysis"),
    ("statistic", "Statistics"),
    ("probability", "Probability"),
    ("regression", "Statistics"),
    ("machine learning", "Machine Learning"),
    ("algebra", "Algebra"),
    ("equation", "Algebra"),
    ("calculus", "Calculus"),
    ("derivative", "Calculus"),
    ("integral", "Calculus"),
    ("proof", "Proofs"),
    ("geometry", "Geometry"),
    ("physics", "Physics"),
    ("motion", "Physics"),
    ("chemistry", "Chemistry"),
    ("essay", "Writing"),
    ("writing", "Writing"),
    ("paragraph", "Writing"),
    ("argument", "Argumentation"),
    ("persuasive", "Argumentation"),
    ("economics", "Economics"),
];

/// Map a loosely-typed difficulty. `intro` is a legacy alias for beginner;
/// anything unrecognised is intermediate.
pub fn normalize_difficulty(value: &Value) -> Difficulty {
    match value {
        Value::String(s) => parse_difficulty(s).unwrap_or_default(),
        _ => Difficulty::default(),
    }
}

pub fn parse_difficulty(raw: &str) -> Option<Difficulty> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "beginner" | "intro" => Some(Difficulty::Beginner),
        "intermediate" => Some(Difficulty::Intermediate),
        "advanced" => Some(Difficulty::Advanced),
        _ => None,
    }
}

/// True when `value` is already one of the three canonical spellings.
pub fn is_canonical_difficulty(value: &Value) -> bool {
    matches!(
        value.as_str(),
        Some("beginner") | Some("intermediate") | Some("advanced")
    )
}

/// Whole minutes clamped to `[10, 240]`; non-numeric input yields 45.
pub fn normalize_duration(value: &Value) -> u32 {
    match as_finite_number(value) {
        Some(minutes) => {
            let clamped = minutes
                .round()
                .clamp(f64::from(MIN_DURATION_MINUTES), f64::from(MAX_DURATION_MINUTES));
            clamped as u32
        }
        None => DEFAULT_DURATION_MINUTES,
    }
}

/// Deduplicated topic strings from an untyped list, before any fallback.
pub fn topic_candidates(value: &Value) -> Vec<String> {
    unique_strings(to_string_array(value), MAX_TOPICS)
}

/// Dedupe, cap at eight and never return an empty list.
pub fn normalize_topics(values: Vec<String>) -> Vec<String> {
    topics_or(values, FALLBACK_TOPIC)
}

pub fn topics_or(values: Vec<String>, fallback: &str) -> Vec<String> {
    let topics = unique_strings(
        values.into_iter().filter(|t| !t.trim().is_empty()),
        MAX_TOPICS,
    );
    if topics.is_empty() {
        vec![fallback.to_string()]
    } else {
        topics
    }
}

/// Topics implied by keyword overlap between a learning goal and the fixed
/// vocabulary, in vocabulary order.
pub fn match_topics(goal: &str) -> Vec<String> {
    let lowered = goal.to_lowercase();
    let tokens: Vec<String> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|s| s.len() >= 2)
        .map(|s| s.to_string())
        .collect();

    let matched = TOPIC_VOCABULARY
        .iter()
        .filter(|(keyword, _)| {
            if keyword.contains(' ') {
                lowered.contains(keyword)
            } else {
                tokens.iter().any(|t| is_word_form(t, keyword))
            }
        })
        .map(|(_, topic)| topic.to_string());

    unique_strings(matched, MAX_TOPICS)
}

fn is_word_form(token: &str, keyword: &str) -> bool {
    match token.strip_prefix(keyword) {
        Some(rest) => matches!(rest, "" | "s" | "es"),
        None => false,
    }
}
