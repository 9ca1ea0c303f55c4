//! Per-shape normalizers.
//!
//! Each submodule turns an arbitrary JSON value into one strictly typed
//! payload. Normalizers are total: malformed input degrades to documented
//! fallbacks and is recorded in a [`NormalizationReport`], never raised.

pub mod analyze;
pub mod build;
mod common;
pub mod derive;
pub mod explain;
pub mod explore;
pub mod revise;

use crate::core::coerce::as_record;
use crate::core::lab::{TemplatePayload, TemplateType};
use crate::core::report::NormalizationReport;
use serde_json::Value;

/// Normalize `data` as the payload for `template_type`.
///
/// Idempotent: feeding the serialized result back in yields the same payload.
pub fn normalize_template_data(template_type: TemplateType, data: &Value) -> TemplatePayload {
    normalize_with_report(template_type, data).0
}

/// Like [`normalize_template_data`], also returning which fields fell back.
pub fn normalize_with_report(
    template_type: TemplateType,
    data: &Value,
) -> (TemplatePayload, NormalizationReport) {
    let mut report = NormalizationReport::new();
    let payload = match template_type {
        TemplateType::Analyze => TemplatePayload::Analyze(analyze::normalize(data, &mut report)),
        TemplateType::Build => TemplatePayload::Build(build::normalize(data, &mut report)),
        TemplateType::Derive => TemplatePayload::Derive(derive::normalize(data, &mut report)),
        TemplateType::Explain => TemplatePayload::Explain(explain::normalize(data, &mut report)),
        TemplateType::Explore => TemplatePayload::Explore(explore::normalize(data, &mut report)),
        TemplateType::Revise => TemplatePayload::Revise(revise::normalize(data, &mut report)),
    };
    (payload, report)
}

/// Normalize by raw discriminant string, as stored records carry it.
///
/// An unknown discriminant cannot select a normalizer, so the data is only
/// shape-guarded to a record.
pub fn normalize_untyped(raw_type: &str, data: &Value) -> Value {
    match TemplateType::parse(raw_type) {
        Some(template_type) => normalize_template_data(template_type, data)
            .data_value()
            .unwrap_or_else(|_| Value::Object(as_record(data).clone())),
        None => {
            tracing::debug!(raw_type, "unknown template type, only shape-guarding data");
            Value::Object(as_record(data).clone())
        }
    }
}
