use labgen::core::lab::{TemplatePayload, TemplateType};
use labgen::templates::normalize_template_data;
use labgen::templates::revise::{ReviseData, improvement_areas};
use serde_json::{Value, json};

fn revise(value: Value) -> ReviseData {
    match normalize_template_data(TemplateType::Revise, &value) {
        TemplatePayload::Revise(data) => data,
        other => panic!("expected revise payload, got {:?}", other.template_type()),
    }
}

#[test]
fn initial_draft_falls_back_through_original_draft_and_task() {
    let data = revise(json!({"initialDraft": "Draft A", "originalDraft": "Draft B"}));
    assert_eq!(data.initial_draft, "Draft A");

    let data = revise(json!({"originalDraft": "Draft B"}));
    assert_eq!(data.initial_draft, "Draft B");

    let data = revise(json!({"writingTask": {"description": "Write a cover letter"}}));
    assert_eq!(data.initial_draft, "Write a cover letter");
}

#[test]
fn improvement_areas_flatten_both_shapes() {
    let areas = improvement_areas(&json!([
        "Clarity",
        {"area": "Structure", "suggestions": ["Add headings", "Shorter paragraphs"]},
        {"area": "clarity", "suggestions": ["Add headings"]},
        42
    ]));
    assert_eq!(
        areas,
        vec!["Clarity", "Structure", "Add headings", "Shorter paragraphs"]
    );
}

#[test]
fn improvement_areas_are_capped_at_twelve() {
    let many: Vec<String> = (0..20).map(|i| format!("Area {}", i)).collect();
    assert_eq!(revise(json!({"improvementAreas": many})).improvement_areas.len(), 12);
}

#[test]
fn rubric_points_default_and_clamp() {
    let data = revise(json!({
        "rubricCriteria": [
            {"name": "Clarity"},
            {"name": "Evidence", "maxPoints": 1000},
            {"name": "Tone", "maxPoints": "3"},
            {"description": "nameless"}
        ]
    }));
    let points: Vec<u32> = data.rubric_criteria.iter().map(|c| c.max_points).collect();
    assert_eq!(points, vec![5, 100, 3]);
    assert_eq!(data.rubric_criteria[0].id, "clarity");
}

#[test]
fn writing_task_is_always_complete() {
    let data = revise(json!(null));
    assert!(!data.writing_task.title.is_empty());
    assert!(!data.writing_task.description.is_empty());
    assert!(!data.writing_task.audience.is_empty());
    assert_eq!(data.initial_draft, data.writing_task.description);
}
