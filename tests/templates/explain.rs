use labgen::core::lab::{Language, TemplatePayload, TemplateType};
use labgen::templates::explain::ExplainData;
use labgen::templates::normalize_template_data;
use serde_json::{Value, json};

fn explain(value: Value) -> ExplainData {
    match normalize_template_data(TemplateType::Explain, &value) {
        TemplatePayload::Explain(data) => data,
        other => panic!("expected explain payload, got {:?}", other.template_type()),
    }
}

#[test]
fn artifact_language_uses_the_build_whitelist() {
    let data = explain(json!({"artifact": {"language": "haskell", "code": "main = pure ()"}}));
    assert_eq!(data.artifact.language, Language::Javascript);
    assert_eq!(data.artifact.code, "main = pure ()");

    let data = explain(json!({"artifact": {"language": "java"}}));
    assert_eq!(data.artifact.language, Language::Java);
}

#[test]
fn missing_artifact_gets_placeholder_title() {
    let data = explain(json!({}));
    assert_eq!(data.artifact.title, "Code Sample");
    assert!(data.artifact.code.is_empty());
    assert!(data.learning_objectives.is_empty());
}

#[test]
fn learning_objectives_are_deduped_and_capped() {
    let objectives: Vec<String> = (0..12).map(|i| format!("Objective {}", i)).collect();
    let mut input = objectives.clone();
    input.insert(1, "objective 0".to_string());
    let data = explain(json!({"learningObjectives": input}));
    assert_eq!(data.learning_objectives.len(), 8);
    assert_eq!(data.learning_objectives[0], "Objective 0");
    assert_eq!(data.learning_objectives[1], "Objective 1");
}

#[test]
fn step_prompt_falls_back_to_title() {
    let data = explain(json!({"steps": [{"title": "What does line 3 do?"}]}));
    assert_eq!(data.steps[0].prompt, "What does line 3 do?");
    assert_eq!(data.steps[0].id, "what-does-line-3-do");
}
