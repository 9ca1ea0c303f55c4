//! Total coercions from untyped JSON into concrete values.
//!
//! Every function here accepts any `serde_json::Value` and returns a typed
//! result or the documented fallback. None of them fail.

use regex::Regex;
use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// An untyped JSON object.
pub type Record = Map<String, Value>;

static EMPTY_RECORD: LazyLock<Record> = LazyLock::new(Map::new);

static NULL: Value = Value::Null;

static NON_ALPHANUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Object fields consulted, in order, when an array element is a record.
const LABEL_FIELDS: &[&str] = &["title", "name", "label", "area", "description", "question"];

/// Returns `value` when it is a JSON object, otherwise an empty record.
pub fn as_record(value: &Value) -> &Record {
    match value {
        Value::Object(map) => map,
        _ => &*EMPTY_RECORD,
    }
}

/// Trimmed string content, or `None` for non-strings and blank strings.
pub fn as_non_empty_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        _ => None,
    }
}

pub fn as_string(value: &Value, fallback: &str) -> String {
    as_non_empty_string(value).unwrap_or_else(|| fallback.to_string())
}

/// Finite numbers pass through; numeric strings are parsed; anything else
/// yields `fallback`.
pub fn as_number(value: &Value, fallback: f64) -> f64 {
    as_finite_number(value).unwrap_or(fallback)
}

pub fn as_finite_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn as_bool(value: &Value, fallback: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => true,
            "false" | "no" => false,
            _ => fallback,
        },
        _ => fallback,
    }
}

/// An id-like value: a non-blank string, or an integer rendered as text.
pub fn as_identifier(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        other => as_non_empty_string(other),
    }
}

/// Free text for code-ish fields: strings verbatim, scalars rendered,
/// arrays/objects as compact JSON, null as the empty string.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// First non-null field among `keys`, or `Value::Null`.
pub fn field<'a>(record: &'a Record, keys: &[&str]) -> &'a Value {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find(|v| !v.is_null())
        .unwrap_or(&NULL)
}

/// First field among `keys` holding a non-blank string.
pub fn first_string(record: &Record, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| record.get(*k))
        .find_map(as_non_empty_string)
}

/// Maps array elements to strings: strings verbatim (trimmed), records via
/// the first of `title|name|label|area|description|question`. Empty results
/// are dropped; non-arrays yield nothing.
pub fn to_string_array(value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(_) => as_non_empty_string(item),
            Value::Object(map) => first_string(map, LABEL_FIELDS),
            _ => None,
        })
        .collect()
}

/// Case-insensitive dedup keeping first-seen casing and order, capped at `max`.
pub fn unique_strings<I>(values: I, max: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut out = Vec::new();
    for value in values {
        if out.len() >= max {
            break;
        }
        if seen.insert(value.to_lowercase()) {
            out.push(value);
        }
    }
    out
}

/// Lowercase, collapse non-alphanumeric runs to `-`, trim hyphens.
/// May return an empty string; callers supply a positional fallback.
pub fn kebab(input: &str) -> String {
    let lower = input.to_lowercase();
    NON_ALPHANUMERIC_RUN
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Hands out unique, non-empty ids within one list.
#[derive(Debug, Default)]
pub struct IdAllocator {
    prefix: &'static str,
    seen: FxHashSet<String>,
}

impl IdAllocator {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            seen: FxHashSet::default(),
        }
    }

    /// Resolve an id for the element at 1-based `position`.
    ///
    /// Explicit ids win; otherwise the title is kebab-cased, falling back to
    /// `{prefix}-{position}` when that is empty. Returns `None` when there is
    /// neither an explicit id nor a title. Collisions get `-2`, `-3`, ...
    pub fn assign(
        &mut self,
        explicit: Option<String>,
        title: Option<&str>,
        position: usize,
    ) -> Option<String> {
        let base = match explicit {
            Some(id) => id,
            None => {
                let derived = kebab(title?);
                if derived.is_empty() {
                    format!("{}-{}", self.prefix, position)
                } else {
                    derived
                }
            }
        };
        if self.seen.insert(base.clone()) {
            return Some(base);
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.seen.insert(candidate.clone()) {
                return Some(candidate);
            }
            n += 1;
        }
    }
}
