//! Helpers shared by the template normalizers: list walking, element
//! identity (id + title) and report paths.

use crate::core::coerce::{IdAllocator, Record, as_identifier, as_record, field, first_string};
use crate::core::report::NormalizationReport;
use serde_json::{Map, Value};

/// Array elements as owned records, with their 0-based index.
///
/// A bare string element becomes `{ text_key: string }`, so `["Read the
/// data", ...]` works for lists whose elements are usually objects. Other
/// non-object elements are dropped and reported.
pub(crate) fn elements(
    value: &Value,
    text_key: &str,
    path: &str,
    report: &mut NormalizationReport,
) -> Vec<(usize, Record)> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::Object(map) => out.push((index, map.clone())),
            Value::String(s) if !s.trim().is_empty() => {
                let mut map = Map::new();
                map.insert(text_key.to_string(), Value::String(s.clone()));
                out.push((index, map));
            }
            _ => report.dropped(element_path(path, index), "not an object"),
        }
    }
    out
}

pub(crate) fn element_path(list: &str, index: usize) -> String {
    format!("{}[{}]", list, index)
}

/// Resolved id and display title of one list element.
pub(crate) struct Identity {
    pub id: String,
    pub title: String,
}

/// Resolve the id/title pair for the element at 0-based `index`.
///
/// Returns `None` (and reports a drop) when the element has neither an
/// explicit id nor a title. A missing title with an explicit id becomes
/// `"{title_fallback} {n}"`.
pub(crate) fn identify(
    record: &Record,
    title_keys: &[&str],
    title_fallback: &str,
    ids: &mut IdAllocator,
    index: usize,
    path: &str,
    report: &mut NormalizationReport,
) -> Option<Identity> {
    let element = element_path(path, index);
    let explicit = as_identifier(field(record, &["id"]));
    let title = first_string(record, title_keys);

    let Some(id) = ids.assign(explicit.clone(), title.as_deref(), index + 1) else {
        report.dropped(element, "no id and no title");
        return None;
    };
    if let Some(explicit) = explicit.as_deref() {
        if explicit != id {
            report.adjusted(format!("{}.id", element), format!("duplicate id renamed to '{}'", id));
        }
    }

    let title = match title {
        Some(t) => t,
        None => {
            let fallback = format!("{} {}", title_fallback, index + 1);
            report.defaulted(format!("{}.title", element), format!("missing, used '{}'", fallback));
            fallback
        }
    };
    Some(Identity { id, title })
}

/// The nested record under the first present key, or an empty record.
pub(crate) fn nested<'a>(record: &'a Record, keys: &[&str]) -> &'a Record {
    as_record(field(record, keys))
}
