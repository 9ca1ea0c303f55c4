//! Text extraction for raw model output.
//!
//! Models are told to answer with JSON only, but they routinely wrap the
//! payload in a markdown code fence. Everything here is total: fence
//! stripping never fails and parsing reports a `ParseFailure` marker
//! instead of propagating, so the caller decides what is fatal.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\A```(?:json)?[ \t]*\r?\n?").unwrap());

static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n?[ \t]*```\z").unwrap());

/// Characters of the offending text kept in a `ParseFailure` preview.
const PREVIEW_CHARS: usize = 120;

/// Marker returned when model text could not be parsed as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    /// Parser message (line/column when available).
    pub reason: String,
    /// Compact preview of the text that failed to parse.
    pub preview: String,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.preview.is_empty() {
            write!(f, "{} (empty response)", self.reason)
        } else {
            write!(f, "{} in '{}'", self.reason, self.preview)
        }
    }
}

/// Remove a leading ```` ```json ```` / ```` ``` ```` line and a trailing
/// ```` ``` ```` line. Text without an opening fence is returned unchanged.
pub fn strip_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(open) = OPENING_FENCE.find(trimmed) else {
        return text.to_string();
    };
    let body = &trimmed[open.end()..];
    let body = match CLOSING_FENCE.find(body) {
        Some(close) => &body[..close.start()],
        None => body,
    };
    body.trim().to_string()
}

/// Model text squeezed onto one line and cut to `max_chars`, for errors
/// and log fields. A cut preview ends in `...`.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut line = String::new();
    for (n, word) in text.split_whitespace().enumerate() {
        if n > 0 {
            line.push(' ');
        }
        line.push_str(word);
    }
    match line.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &line[..cut]),
        None => line,
    }
}

/// Strip fences, then parse. Any parser error becomes a `ParseFailure`.
pub fn try_parse_json(text: &str) -> Result<Value, ParseFailure> {
    let cleaned = strip_fences(text);
    let cleaned = cleaned.trim().trim_start_matches('\u{feff}');
    if cleaned.is_empty() {
        return Err(ParseFailure {
            reason: "no JSON content".to_string(),
            preview: String::new(),
        });
    }
    serde_json::from_str(cleaned).map_err(|e| ParseFailure {
        reason: e.to_string(),
        preview: preview(cleaned, PREVIEW_CHARS),
    })
}
