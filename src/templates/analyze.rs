//! Analyze labs: a small dataset, four guiding questions and analysis steps.
//!
//! Column types are always re-inferred from the row values, so a payload
//! whose declared types disagree with its data is corrected rather than
//! trusted.

use crate::core::coerce::{
    IdAllocator, Record, as_finite_number, field, first_string, to_string_array,
};
use crate::core::report::NormalizationReport;
use crate::templates::common::{element_path, elements, identify, nested};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

const MAX_ROWS: usize = 50;
const DEFAULT_SCENARIO: &str =
    "Examine the dataset and use the guiding questions to reach an evidence-based conclusion.";
const DEFAULT_DATASET_NAME: &str = "Dataset";

const OBSERVE_FALLBACK: &str = "What do you notice first about the data?";
const PATTERN_FALLBACK: &str = "What patterns or trends stand out?";
const HYPOTHESIS_FALLBACK: &str = "What might explain these patterns?";
const CONCLUSION_FALLBACK: &str = "What conclusion can you support with the evidence?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
    Date,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Number => "number",
            ColumnType::String => "string",
            ColumnType::Date => "date",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "number" | "numeric" | "integer" | "float" => Some(ColumnType::Number),
            "string" | "text" | "category" | "categorical" => Some(ColumnType::String),
            "date" => Some(ColumnType::Date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetColumn {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub name: String,
    pub description: String,
    pub columns: Vec<DatasetColumn>,
    /// Sparse rows: a row may omit any column.
    pub rows: Vec<Map<String, Value>>,
}

/// The four fixed question slots of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidingQuestions {
    pub observe: String,
    pub pattern: String,
    pub hypothesis: String,
    pub conclusion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeStep {
    pub id: String,
    pub title: String,
    pub instruction: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeData {
    pub scenario: String,
    pub dataset: Dataset,
    pub guiding_questions: GuidingQuestions,
    pub steps: Vec<AnalyzeStep>,
}

pub fn normalize(value: &Value, report: &mut NormalizationReport) -> AnalyzeData {
    let record = crate::core::coerce::as_record(value);

    let scenario = report.string_or(
        "scenario",
        first_string(record, &["scenario", "context", "problemStatement", "description"]),
        DEFAULT_SCENARIO,
    );

    AnalyzeData {
        scenario,
        dataset: normalize_dataset(record, report),
        guiding_questions: normalize_questions(
            field(record, &["guidingQuestions", "guiding_questions", "questions"]),
            report,
        ),
        steps: normalize_steps(field(record, &["steps"]), report),
    }
}

fn normalize_dataset(record: &Record, report: &mut NormalizationReport) -> Dataset {
    let dataset = nested(record, &["dataset"]);

    let name = report.string_or(
        "dataset.name",
        first_string(dataset, &["name", "title"]),
        DEFAULT_DATASET_NAME,
    );
    let description = first_string(dataset, &["description"]).unwrap_or_default();

    let mut rows_value = field(dataset, &["rows", "records", "data"]);
    if rows_value.is_null() {
        rows_value = field(record, &["rows"]);
    }
    let rows = normalize_rows(rows_value, report);

    let mut columns_value = field(dataset, &["columns", "fields"]);
    if columns_value.is_null() {
        columns_value = field(record, &["columns"]);
    }
    let mut columns = explicit_columns(columns_value, report);
    if columns.is_empty() {
        columns = columns_from_first_row(&rows);
        if !columns.is_empty() {
            report.defaulted("dataset.columns", "derived from the keys of the first row");
        }
    }

    for (index, column) in columns.iter_mut().enumerate() {
        if let Some(inferred) = infer_column_type(&column.key, &rows) {
            if inferred != column.column_type {
                report.adjusted(
                    format!("{}.type", element_path("dataset.columns", index)),
                    format!("inferred '{}' from row values", inferred.as_str()),
                );
                column.column_type = inferred;
            }
        }
    }

    Dataset {
        name,
        description,
        columns,
        rows,
    }
}

/// Object rows only, scalar cells only, at most fifty rows.
fn normalize_rows(value: &Value, report: &mut NormalizationReport) -> Vec<Map<String, Value>> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    let mut rows = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Value::Object(cells) = item else {
            report.dropped(element_path("dataset.rows", index), "row is not an object");
            continue;
        };
        if rows.len() >= MAX_ROWS {
            report.dropped(element_path("dataset.rows", index), "row limit reached");
            continue;
        }
        let mut row = Map::new();
        for (key, cell) in cells {
            if cell.is_array() || cell.is_object() {
                report.dropped(
                    format!("{}.{}", element_path("dataset.rows", index), key),
                    "nested cell value",
                );
                continue;
            }
            row.insert(key.clone(), cell.clone());
        }
        rows.push(row);
    }
    rows
}

fn explicit_columns(value: &Value, report: &mut NormalizationReport) -> Vec<DatasetColumn> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut columns = Vec::new();
    for (index, column) in elements(value, "key", "dataset.columns", report) {
        let path = element_path("dataset.columns", index);
        let Some(key) = first_string(&column, &["key", "name", "id", "field"]) else {
            report.dropped(path, "column has no key");
            continue;
        };
        if !seen.insert(key.clone()) {
            report.dropped(path, format!("duplicate column '{}'", key));
            continue;
        }
        let label = match first_string(&column, &["label", "title", "header"]) {
            Some(label) => label,
            None => {
                report.defaulted(format!("{}.label", path), "missing, derived from key");
                humanize(&key)
            }
        };
        let column_type = first_string(&column, &["type", "dataType", "data_type"])
            .and_then(|t| ColumnType::parse(&t))
            .unwrap_or(ColumnType::String);
        columns.push(DatasetColumn {
            key,
            label,
            column_type,
        });
    }
    columns
}

fn columns_from_first_row(rows: &[Map<String, Value>]) -> Vec<DatasetColumn> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    first
        .keys()
        .filter(|k| !k.trim().is_empty())
        .map(|key| DatasetColumn {
            key: key.clone(),
            label: humanize(key),
            column_type: ColumnType::String,
        })
        .collect()
}

/// `number` if every non-null cell is numeric, `date` if every cell is a
/// valid `YYYY-MM-DD` date, else `string`. `None` when the column has no
/// non-null cells at all.
pub fn infer_column_type(key: &str, rows: &[Map<String, Value>]) -> Option<ColumnType> {
    let cells: Vec<&Value> = rows
        .iter()
        .filter_map(|row| row.get(key))
        .filter(|v| !v.is_null() && v.as_str().is_none_or(|s| !s.trim().is_empty()))
        .collect();
    if cells.is_empty() {
        return None;
    }
    if cells.iter().all(|v| as_finite_number(v).is_some()) {
        return Some(ColumnType::Number);
    }
    if cells.iter().all(|v| v.as_str().is_some_and(is_iso_date)) {
        return Some(ColumnType::Date);
    }
    Some(ColumnType::String)
}

pub fn is_iso_date(raw: &str) -> bool {
    let Some(caps) = ISO_DATE.captures(raw.trim()) else {
        return false;
    };
    let (Ok(year), Ok(month), Ok(day)) = (
        caps[1].parse::<u32>(),
        caps[2].parse::<u32>(),
        caps[3].parse::<u32>(),
    ) else {
        return false;
    };
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    let days_in_month = match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if leap => 29,
        2 => 28,
        _ => return false,
    };
    (1..=days_in_month).contains(&day)
}

fn humanize(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn normalize_questions(value: &Value, report: &mut NormalizationReport) -> GuidingQuestions {
    let slots = ["observe", "pattern", "hypothesis", "conclusion"];
    let fallbacks = [
        OBSERVE_FALLBACK,
        PATTERN_FALLBACK,
        HYPOTHESIS_FALLBACK,
        CONCLUSION_FALLBACK,
    ];

    let mut answers: [Option<String>; 4] = Default::default();
    match value {
        Value::Object(map) => {
            for (slot, answer) in slots.iter().zip(answers.iter_mut()) {
                *answer = first_string(map, &[slot]);
            }
        }
        Value::Array(_) => {
            for (answer, text) in answers.iter_mut().zip(to_string_array(value)) {
                *answer = Some(text);
            }
        }
        _ => {}
    }

    let [observe, pattern, hypothesis, conclusion] = answers;
    GuidingQuestions {
        observe: report.string_or("guidingQuestions.observe", observe, fallbacks[0]),
        pattern: report.string_or("guidingQuestions.pattern", pattern, fallbacks[1]),
        hypothesis: report.string_or("guidingQuestions.hypothesis", hypothesis, fallbacks[2]),
        conclusion: report.string_or("guidingQuestions.conclusion", conclusion, fallbacks[3]),
    }
}

fn normalize_steps(value: &Value, report: &mut NormalizationReport) -> Vec<AnalyzeStep> {
    let mut ids = IdAllocator::new("step");
    let mut steps = Vec::new();
    for (index, step) in elements(value, "title", "steps", report) {
        let Some(identity) = identify(
            &step,
            &["title", "name"],
            "Step",
            &mut ids,
            index,
            "steps",
            report,
        ) else {
            continue;
        };
        let instruction = report.string_or(
            &format!("{}.instruction", element_path("steps", index)),
            first_string(&step, &["instruction", "description", "prompt", "content"]),
            &identity.title,
        );
        steps.push(AnalyzeStep {
            id: identity.id,
            title: identity.title,
            instruction,
            hint: first_string(&step, &["hint"]).unwrap_or_default(),
        });
    }
    steps
}
