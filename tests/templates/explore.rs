use labgen::core::lab::{TemplatePayload, TemplateType};
use labgen::templates::explore::ExploreData;
use labgen::templates::normalize_template_data;
use serde_json::{Value, json};

fn explore(value: Value) -> ExploreData {
    match normalize_template_data(TemplateType::Explore, &value) {
        TemplatePayload::Explore(data) => data,
        other => panic!("expected explore payload, got {:?}", other.template_type()),
    }
}

#[test]
fn max_not_above_min_is_recomputed() {
    let data = explore(json!({"parameters": [{"name": "Angle", "min": 10, "max": 5, "step": 0.5}]}));
    let p = &data.parameters[0];
    assert_eq!(p.min, 10.0);
    assert_eq!(p.max, 11.0);

    let data = explore(json!({"parameters": [{"name": "Mass", "min": 0, "max": 0, "step": 5}]}));
    assert_eq!(data.parameters[0].max, 5.0);
}

#[test]
fn non_positive_step_becomes_one() {
    let data = explore(json!({"parameters": [{"name": "Rate", "min": 0, "max": 10, "step": -2}]}));
    assert_eq!(data.parameters[0].step, 1.0);
    let data = explore(json!({"parameters": [{"name": "Rate", "min": 0, "max": 10, "step": "abc"}]}));
    assert_eq!(data.parameters[0].step, 1.0);
}

#[test]
fn default_value_falls_back_to_min_and_is_clamped() {
    let data = explore(json!({
        "parameters": [
            {"name": "A", "min": 2, "max": 8},
            {"name": "B", "min": 2, "max": 8, "defaultValue": 50},
            {"name": "C", "min": 2, "max": 8, "defaultValue": "4"}
        ]
    }));
    assert_eq!(data.parameters[0].default_value, 2.0);
    assert_eq!(data.parameters[1].default_value, 8.0);
    assert_eq!(data.parameters[2].default_value, 4.0);
}

#[test]
fn every_parameter_satisfies_range_invariants() {
    let data = explore(json!({
        "parameters": [
            {"name": "a"},
            {"name": "b", "min": "x", "max": -3},
            {"id": "c", "min": 1e3, "step": 0},
            {"unit": "m"}
        ]
    }));
    assert_eq!(data.parameters.len(), 3);
    for p in &data.parameters {
        assert!(p.min < p.max, "{:?}", p);
        assert!(p.step > 0.0);
        assert!(p.min <= p.default_value && p.default_value <= p.max);
        assert!(!p.id.is_empty());
    }
    assert_eq!(data.parameters[2].name, "c");
}

#[test]
fn extreme_bounds_keep_max_finite_and_above_min() {
    let data = explore(json!({
        "parameters": [
            {"name": "Big", "min": 1e17, "max": 1e17, "step": 1},
            {"name": "Huge", "min": 0, "step": 1e308},
            {"name": "Edge", "min": 1.7e308, "max": -1}
        ]
    }));
    assert_eq!(data.parameters.len(), 3);
    for p in &data.parameters {
        assert!(p.max.is_finite(), "{:?}", p);
        assert!(p.min < p.max, "{:?}", p);
    }
    assert_eq!(data.parameters[1].max, 1e308);

    let serialized = serde_json::to_value(&data).unwrap();
    for p in serialized["parameters"].as_array().unwrap() {
        assert!(p["max"].is_number(), "{}", p);
        assert!(p["min"].is_number(), "{}", p);
    }
    assert_eq!(explore(serialized), data);
}

#[test]
fn guiding_questions_are_deduped_capped_and_never_empty() {
    let fallback = explore(json!({"guidingQuestions": []}));
    assert_eq!(fallback.guiding_questions.len(), 3);

    let many: Vec<String> = (0..10).map(|i| format!("Q{}?", i)).collect();
    let data = explore(json!({"guidingQuestions": many}));
    assert_eq!(data.guiding_questions.len(), 8);

    let data = explore(json!({"guidingQuestions": ["Why?", "why?", {"question": "How?"}]}));
    assert_eq!(data.guiding_questions, vec!["Why?", "How?"]);
}
