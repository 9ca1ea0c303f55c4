use labgen::core::canonical::{match_topics, normalize_duration, normalize_topics};
use labgen::core::coerce::{as_number, kebab, to_string_array, unique_strings};
use labgen::core::extract::{strip_fences, try_parse_json};
use labgen::core::lab::{Difficulty, LabSpec, TemplateType};
use labgen::error::LabgenError;
use serde_json::json;

#[test]
fn fenced_json_parses() {
    let value = try_parse_json("```json\n{\"template_type\": \"build\"}\n```").unwrap();
    assert_eq!(value["template_type"], "build");
    let value = try_parse_json("```JSON\n[1, 2]\n```").unwrap();
    assert_eq!(value, json!([1, 2]));
}

#[test]
fn prose_is_a_parse_failure_not_a_panic() {
    let failure = try_parse_json("Sure! I think a build lab fits best.").unwrap_err();
    assert!(failure.preview.starts_with("Sure!"));
    assert!(try_parse_json("").is_err());
}

#[test]
fn unfenced_text_is_unchanged() {
    assert_eq!(strip_fences("{\"a\": 1}"), "{\"a\": 1}");
}

#[test]
fn duration_is_always_whole_and_in_range() {
    let inputs = [
        json!(-1e9),
        json!(0),
        json!(9.49),
        json!(10.5),
        json!(45),
        json!("120"),
        json!("  239.6 "),
        json!(1e12),
        json!("abc"),
        json!(null),
        json!([30]),
    ];
    for input in inputs {
        let minutes = normalize_duration(&input);
        assert!((10..=240).contains(&minutes), "{} -> {}", input, minutes);
    }
    assert_eq!(normalize_duration(&json!("  239.6 ")), 240);
    assert_eq!(normalize_duration(&json!(10.5)), 11);
}

#[test]
fn topics_are_bounded_deduped_and_never_empty() {
    let many: Vec<String> = (0..20)
        .flat_map(|i| [format!("Topic {}", i), format!("TOPIC {}", i)])
        .collect();
    let topics = normalize_topics(many);
    assert_eq!(topics.len(), 8);
    let mut lowered: Vec<String> = topics.iter().map(|t| t.to_lowercase()).collect();
    lowered.sort();
    lowered.dedup();
    assert_eq!(lowered.len(), 8);
    assert_eq!(normalize_topics(Vec::new()), vec!["Practice"]);
}

#[test]
fn goal_keywords_map_to_topics() {
    assert_eq!(
        match_topics("Write a recursive function over a binary tree"),
        vec!["Recursion", "Functions", "Trees"]
    );
}

#[test]
fn coercers_are_total() {
    assert_eq!(as_number(&json!({"n": 1}), 2.0), 2.0);
    assert!(to_string_array(&json!({"not": "array"})).is_empty());
    assert_eq!(kebab("***"), "");
    assert_eq!(unique_strings(Vec::<String>::new(), 3), Vec::<String>::new());
}

#[test]
fn stored_lab_requires_a_known_template_type() {
    let err = LabSpec::from_value(&json!({"templateType": "quiz"})).unwrap_err();
    assert!(matches!(err, LabgenError::ValidationError(_)));
    assert!(LabSpec::from_value(&json!({"title": "No type"})).is_err());
}

#[test]
fn stored_lab_is_canonicalized() {
    let (spec, report) = LabSpec::from_value(&json!({
        "templateType": "Explore",
        "title": "  ",
        "difficulty": "intro",
        "estimatedDurationMinutes": 3,
        "topics": ["Physics", "physics", "Motion"],
        "templateData": {}
    }))
    .unwrap();
    assert_eq!(spec.template_type(), TemplateType::Explore);
    assert_eq!(spec.title, "Untitled Explore Lab");
    assert_eq!(spec.difficulty, Difficulty::Beginner);
    assert_eq!(spec.estimated_duration_minutes, 10);
    assert_eq!(spec.topics, vec!["Physics", "Motion"]);
    assert!(!report.is_clean());
}

#[test]
fn lab_spec_serializes_with_flattened_discriminant() {
    let (spec, _) = LabSpec::from_value(&json!({"templateType": "revise"})).unwrap();
    let value = serde_json::to_value(&spec).unwrap();
    assert_eq!(value["templateType"], "revise");
    assert!(value["templateData"].is_object());
    assert_eq!(value["estimatedDurationMinutes"], 45);
    assert_eq!(value["topics"], json!(["Practice"]));
    assert_eq!(spec.content_hash_hex().unwrap().len(), 64);
}
