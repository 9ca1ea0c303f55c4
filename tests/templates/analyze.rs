use labgen::core::lab::{TemplatePayload, TemplateType};
use labgen::core::report::ReportKind;
use labgen::templates::analyze::{AnalyzeData, ColumnType, infer_column_type, is_iso_date};
use labgen::templates::{normalize_template_data, normalize_with_report};
use serde_json::{Value, json};

fn analyze(value: Value) -> AnalyzeData {
    match normalize_template_data(TemplateType::Analyze, &value) {
        TemplatePayload::Analyze(data) => data,
        other => panic!("expected analyze payload, got {:?}", other.template_type()),
    }
}

fn column_type(data: &AnalyzeData, key: &str) -> ColumnType {
    data.dataset
        .columns
        .iter()
        .find(|c| c.key == key)
        .map(|c| c.column_type)
        .unwrap_or_else(|| panic!("no column {}", key))
}

#[test]
fn numeric_columns_are_inferred_from_rows() {
    let data = analyze(json!({"dataset": {"rows": [{"x": 1}, {"x": 2}]}}));
    assert_eq!(data.dataset.columns.len(), 1);
    assert_eq!(data.dataset.columns[0].key, "x");
    assert_eq!(column_type(&data, "x"), ColumnType::Number);
}

#[test]
fn date_columns_require_valid_calendar_dates() {
    let data = analyze(json!({"dataset": {"rows": [{"d": "2024-01-01"}, {"d": "2024-02-01"}]}}));
    assert_eq!(column_type(&data, "d"), ColumnType::Date);

    let data = analyze(json!({"dataset": {"rows": [{"d": "2024-02-30"}]}}));
    assert_eq!(column_type(&data, "d"), ColumnType::String);
}

#[test]
fn mixed_columns_fall_back_to_string() {
    let data = analyze(json!({"dataset": {"rows": [{"s": "a"}, {"s": 1}]}}));
    assert_eq!(column_type(&data, "s"), ColumnType::String);
}

#[test]
fn numeric_strings_and_nulls_still_infer_number() {
    let rows = vec![
        json!({"v": "3.5"}).as_object().unwrap().clone(),
        json!({"v": null}).as_object().unwrap().clone(),
        json!({"v": ""}).as_object().unwrap().clone(),
        json!({"v": 4}).as_object().unwrap().clone(),
    ];
    assert_eq!(infer_column_type("v", &rows), Some(ColumnType::Number));
    assert_eq!(infer_column_type("missing", &rows), None);
}

#[test]
fn declared_column_types_are_corrected_by_the_data() {
    let (payload, report) = normalize_with_report(
        TemplateType::Analyze,
        &json!({
            "dataset": {
                "columns": [
                    {"key": "year", "label": "Year", "type": "string"},
                    {"key": "note", "label": "Note", "type": "date"},
                    {"key": "empty", "label": "Empty", "type": "number"}
                ],
                "rows": [{"year": 2020, "note": "ok"}, {"year": 2021, "note": "fine"}]
            }
        }),
    );
    let TemplatePayload::Analyze(data) = payload else {
        panic!("expected analyze payload");
    };
    assert_eq!(column_type(&data, "year"), ColumnType::Number);
    assert_eq!(column_type(&data, "note"), ColumnType::String);
    // No data at all: the declared type stands.
    assert_eq!(column_type(&data, "empty"), ColumnType::Number);
    assert!(
        report
            .entries
            .iter()
            .any(|e| e.path == "dataset.columns[0].type" && e.kind == ReportKind::Adjusted)
    );
}

#[test]
fn columns_follow_first_row_key_order() {
    let data = analyze(json!({
        "dataset": {"rows": [{"year": 2020, "region": "N", "amount": 3}]}
    }));
    let keys: Vec<&str> = data.dataset.columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys, vec!["year", "region", "amount"]);

    let row_keys: Vec<&str> = data.dataset.rows[0].keys().map(String::as_str).collect();
    assert_eq!(row_keys, vec!["year", "region", "amount"]);
}

#[test]
fn rows_drop_nested_cells_and_are_capped() {
    let rows: Vec<Value> = (0..60).map(|i| json!({"i": i, "tags": ["a"]})).collect();
    let data = analyze(json!({"dataset": {"rows": rows}}));
    assert_eq!(data.dataset.rows.len(), 50);
    assert!(data.dataset.rows.iter().all(|r| !r.contains_key("tags")));
    assert_eq!(data.dataset.columns.len(), 1);
}

#[test]
fn guiding_questions_fill_every_slot() {
    let data = analyze(json!({"guidingQuestions": {"observe": "What stands out?"}}));
    assert_eq!(data.guiding_questions.observe, "What stands out?");
    assert!(!data.guiding_questions.pattern.is_empty());
    assert!(!data.guiding_questions.hypothesis.is_empty());
    assert!(!data.guiding_questions.conclusion.is_empty());

    let data = analyze(json!({"guidingQuestions": ["a?", "b?"]}));
    assert_eq!(data.guiding_questions.observe, "a?");
    assert_eq!(data.guiding_questions.pattern, "b?");
}

#[test]
fn steps_get_unique_ids_and_unidentifiable_steps_are_dropped() {
    let data = analyze(json!({
        "steps": [
            {"title": "Plot the data"},
            {"title": "Plot the data"},
            {"instruction": "no title or id"},
            "Summarize"
        ]
    }));
    let ids: Vec<&str> = data.steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["plot-the-data", "plot-the-data-2", "summarize"]);
    assert_eq!(data.steps[2].instruction, "Summarize");
}

#[test]
fn garbage_input_still_yields_a_complete_payload() {
    let data = analyze(json!("not an object"));
    assert!(!data.scenario.is_empty());
    assert_eq!(data.dataset.name, "Dataset");
    assert!(data.dataset.columns.is_empty());
    assert!(data.steps.is_empty());
}

#[test]
fn iso_dates_check_month_lengths() {
    assert!(is_iso_date("2024-02-29"));
    assert!(!is_iso_date("2023-02-29"));
    assert!(!is_iso_date("2024-13-01"));
    assert!(!is_iso_date("24-01-01"));
}
