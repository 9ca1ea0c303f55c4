//! Normalization report: which fields fell back and which elements were dropped.
//!
//! Normalization never fails, so without this a caller cannot tell a clean
//! generation from a degraded one. Re-normalizing an already normalized
//! payload yields an empty report.

use crate::core::extract::preview;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// The field was missing or malformed and a default was substituted.
    Defaulted,
    /// A list element could not be normalized and was removed.
    Dropped,
    /// The value was present but replaced (remapped, clamped, renamed).
    Adjusted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// JSON-pointer-ish location, e.g. `templateData.steps[2].id`.
    pub path: String,
    pub kind: ReportKind,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub entries: Vec<ReportEntry>,
}

impl NormalizationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaulted(&mut self, path: impl Into<String>, detail: impl Into<String>) {
        self.push(path.into(), ReportKind::Defaulted, detail.into());
    }

    pub fn dropped(&mut self, path: impl Into<String>, detail: impl Into<String>) {
        self.push(path.into(), ReportKind::Dropped, detail.into());
    }

    pub fn adjusted(&mut self, path: impl Into<String>, detail: impl Into<String>) {
        self.push(path.into(), ReportKind::Adjusted, detail.into());
    }

    /// `value` when present, otherwise `fallback` (recorded as defaulted).
    pub fn string_or(&mut self, path: &str, value: Option<String>, fallback: &str) -> String {
        match value {
            Some(v) => v,
            None => {
                self.defaulted(path, format!("missing, used '{}'", fallback));
                fallback.to_string()
            }
        }
    }

    /// `value` when present, otherwise `fallback` (recorded as defaulted).
    pub fn number_or(&mut self, path: &str, value: Option<f64>, fallback: f64) -> f64 {
        match value {
            Some(v) => v,
            None => {
                self.defaulted(path, format!("missing or not numeric, used {}", fallback));
                fallback
            }
        }
    }

    /// Fold another report in, prefixing its paths.
    pub fn absorb(&mut self, prefix: &str, other: NormalizationReport) {
        for entry in other.entries {
            self.entries.push(ReportEntry {
                path: format!("{}.{}", prefix, entry.path),
                ..entry
            });
        }
    }

    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, kind: ReportKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// One-line summary for logs and terminal output.
    pub fn summary(&self, max_items: usize) -> String {
        if self.is_clean() {
            return "clean".to_string();
        }
        let mut summary = self
            .entries
            .iter()
            .take(max_items)
            .map(|e| preview(&format!("{}: {}", e.path, e.detail), 80))
            .collect::<Vec<_>>()
            .join("; ");
        let hidden = self.entries.len().saturating_sub(max_items);
        if hidden > 0 {
            summary.push_str(&format!(" and {} more", hidden));
        }
        summary
    }

    fn push(&mut self, path: String, kind: ReportKind, detail: String) {
        tracing::trace!(path = %path, kind = ?kind, detail = %detail, "normalization fallback");
        self.entries.push(ReportEntry { path, kind, detail });
    }
}
