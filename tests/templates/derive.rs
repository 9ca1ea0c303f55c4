use labgen::core::lab::{TemplatePayload, TemplateType};
use labgen::templates::derive::DeriveData;
use labgen::templates::normalize_template_data;
use serde_json::{Value, json};

fn derive(value: Value) -> DeriveData {
    match normalize_template_data(TemplateType::Derive, &value) {
        TemplatePayload::Derive(data) => data,
        other => panic!("expected derive payload, got {:?}", other.template_type()),
    }
}

#[test]
fn problem_statement_falls_back_to_goal_then_generic_text() {
    assert_eq!(
        derive(json!({"goal": "Differentiate x^2"})).problem_statement,
        "Differentiate x^2"
    );
    let generic = derive(json!({})).problem_statement;
    assert!(!generic.is_empty());
    assert_eq!(
        derive(json!({"problemStatement": "Prove it", "goal": "ignored"})).problem_statement,
        "Prove it"
    );
}

#[test]
fn expected_steps_defaults_to_step_count_then_four() {
    assert_eq!(derive(json!({})).expected_steps, 4);
    let data = derive(json!({"steps": ["Expand", "Simplify"]}));
    assert_eq!(data.expected_steps, 2);
    assert_eq!(derive(json!({"expectedSteps": "7"})).expected_steps, 7);
}

#[test]
fn expected_steps_is_clamped() {
    assert_eq!(derive(json!({"expectedSteps": 0})).expected_steps, 1);
    assert_eq!(derive(json!({"expectedSteps": 500})).expected_steps, 50);
}

#[test]
fn initial_step_is_always_populated() {
    let data = derive(json!({"initialStep": {"expression": "f(x) = x^2"}}));
    assert_eq!(data.initial_step.expression, "f(x) = x^2");
    assert_eq!(data.initial_step.justification, "Given");
    let data = derive(json!({"initialStep": null}));
    assert!(!data.initial_step.expression.is_empty());
}

#[test]
fn rules_get_ids_from_names_with_positional_fallback() {
    let data = derive(json!({
        "availableRules": [
            {"name": "Power Rule", "formula": "d/dx x^n = n x^(n-1)"},
            {"name": "∂∂"},
            {"description": "no name"},
            {"id": "chain", "name": "Chain Rule"}
        ]
    }));
    let ids: Vec<&str> = data.available_rules.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["power-rule", "rule-2", "chain"]);
    assert_eq!(data.available_rules[0].formula, "d/dx x^n = n x^(n-1)");
}

#[test]
fn steps_without_justification_get_a_generic_one() {
    let data = derive(json!({"steps": [{"title": "Expand", "expression": "x*x"}]}));
    assert_eq!(data.steps[0].expression, "x*x");
    assert!(!data.steps[0].justification.is_empty());
}
