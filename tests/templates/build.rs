use labgen::core::lab::{Language, TemplatePayload, TemplateType};
use labgen::core::report::ReportKind;
use labgen::templates::build::{BuildData, WidgetType};
use labgen::templates::{normalize_template_data, normalize_with_report};
use serde_json::{Value, json};

fn build(value: Value) -> BuildData {
    match normalize_template_data(TemplateType::Build, &value) {
        TemplatePayload::Build(data) => data,
        other => panic!("expected build payload, got {:?}", other.template_type()),
    }
}

#[test]
fn unsupported_language_falls_back_to_javascript() {
    let data = build(json!({"language": "rust"}));
    assert_eq!(data.language, Language::Javascript);
    assert!(data.initial_code.starts_with("//"));
}

#[test]
fn language_aliases_are_canonicalized() {
    assert_eq!(build(json!({"language": "py"})).language, Language::Python);
    assert_eq!(build(json!({"language": "C++"})).language, Language::Cpp);
    assert_eq!(build(json!({"language": "TypeScript"})).language, Language::Typescript);
}

#[test]
fn python_stub_uses_hash_comment() {
    let data = build(json!({"language": "python"}));
    assert_eq!(data.initial_code, "# Write your solution here\n");
}

#[test]
fn initial_code_is_kept_verbatim() {
    let code = "function twoSum(nums, target) {\n  \n}\n";
    assert_eq!(build(json!({"initialCode": code})).initial_code, code);
}

#[test]
fn empty_test_cases_synthesize_one_default() {
    let (payload, report) = normalize_with_report(TemplateType::Build, &json!({"testCases": []}));
    let TemplatePayload::Build(data) = payload else {
        panic!("expected build payload");
    };
    assert_eq!(data.test_cases.len(), 1);
    assert_eq!(data.test_cases[0].id, "test-1");
    assert!(!data.test_cases[0].name.is_empty());
    assert!(
        report
            .entries
            .iter()
            .any(|e| e.path == "testCases" && e.kind == ReportKind::Defaulted)
    );
}

#[test]
fn test_cases_render_structured_values_and_name_unnamed_cases() {
    let data = build(json!({
        "testCases": [
            {"input": {"nums": [2, 7], "target": 9}, "expectedOutput": [0, 1]},
            {"name": "Empty", "input": "[]", "expected": "[]", "hidden": "yes"},
            {"note": "nothing usable"}
        ]
    }));
    assert_eq!(data.test_cases.len(), 2);
    assert_eq!(data.test_cases[0].name, "Test case 1");
    assert_eq!(data.test_cases[0].id, "test-case-1");
    assert_eq!(data.test_cases[0].input, r#"{"nums":[2,7],"target":9}"#);
    assert_eq!(data.test_cases[0].expected_output, "[0,1]");
    assert!(data.test_cases[1].hidden);
    assert_eq!(data.test_cases[1].id, "empty");
}

#[test]
fn duplicate_explicit_test_ids_are_suffixed() {
    let data = build(json!({
        "testCases": [
            {"id": "t", "name": "A", "input": "1"},
            {"id": "t", "name": "B", "input": "2"}
        ]
    }));
    let ids: Vec<&str> = data.test_cases.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t", "t-2"]);
}

#[test]
fn widgets_are_whitelisted_and_text_input_becomes_editor() {
    let data = build(json!({
        "steps": [{
            "title": "Write it",
            "widgets": [
                {"type": "text-input", "label": "Code"},
                {"type": "slider"},
                {"type": "multiple-choice", "options": ["a", "b"]},
                "checklist",
                {"label": "typeless"}
            ]
        }]
    }));
    let widgets = &data.steps[0].widgets;
    let kinds: Vec<WidgetType> = widgets.iter().map(|w| w.widget_type).collect();
    assert_eq!(
        kinds,
        vec![WidgetType::Editor, WidgetType::MultipleChoice, WidgetType::Checklist]
    );
    assert_eq!(widgets[0].label, "Code");
    assert_eq!(widgets[1].options, vec!["a", "b"]);
}

#[test]
fn widget_types_serialize_in_kebab_case() {
    let data = build(json!({"steps": [{"title": "s", "widgets": [{"type": "test_runner"}]}]}));
    let value = serde_json::to_value(&data).unwrap();
    assert_eq!(value["steps"][0]["widgets"][0]["type"], "test-runner");
}

#[test]
fn hints_are_deduplicated() {
    let data = build(json!({"hints": ["Use a map", "use a map", {"title": "Think O(n)"}]}));
    assert_eq!(data.hints, vec!["Use a map", "Think O(n)"]);
}
