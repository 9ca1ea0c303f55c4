//! Revise labs: improve a draft against a rubric.

use crate::core::coerce::{
    IdAllocator, as_finite_number, as_non_empty_string, as_record, field, first_string,
    to_string_array, unique_strings,
};
use crate::core::report::NormalizationReport;
use crate::templates::common::{element_path, elements, identify, nested};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_TASK_TITLE: &str = "Writing Task";
const DEFAULT_TASK_DESCRIPTION: &str = "Revise the draft to make it clearer and more convincing.";
const DEFAULT_AUDIENCE: &str = "General readers";
const DEFAULT_MAX_POINTS: u32 = 5;
const MAX_POINTS_LIMIT: u32 = 100;
const MAX_IMPROVEMENT_AREAS: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingTask {
    pub title: String,
    pub description: String,
    pub audience: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RubricCriterion {
    pub id: String,
    pub name: String,
    pub description: String,
    pub max_points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviseStep {
    pub id: String,
    pub title: String,
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviseData {
    pub writing_task: WritingTask,
    pub initial_draft: String,
    pub rubric_criteria: Vec<RubricCriterion>,
    pub improvement_areas: Vec<String>,
    pub steps: Vec<ReviseStep>,
}

pub fn normalize(value: &Value, report: &mut NormalizationReport) -> ReviseData {
    let record = as_record(value);
    let task = nested(record, &["writingTask", "writing_task", "task"]);

    let writing_task = WritingTask {
        title: report.string_or(
            "writingTask.title",
            first_string(task, &["title", "name"]),
            DEFAULT_TASK_TITLE,
        ),
        description: report.string_or(
            "writingTask.description",
            first_string(task, &["description", "prompt"]),
            DEFAULT_TASK_DESCRIPTION,
        ),
        audience: report.string_or(
            "writingTask.audience",
            first_string(task, &["audience"]),
            DEFAULT_AUDIENCE,
        ),
    };

    let initial_draft = match first_string(record, &["initialDraft", "initial_draft"]) {
        Some(draft) => draft,
        None => match first_string(record, &["originalDraft", "original_draft", "draft"]) {
            Some(draft) => {
                report.adjusted("initialDraft", "taken from originalDraft");
                draft
            }
            None => {
                report.defaulted("initialDraft", "missing, used the task description");
                writing_task.description.clone()
            }
        },
    };

    ReviseData {
        writing_task,
        initial_draft,
        rubric_criteria: normalize_rubric(
            field(record, &["rubricCriteria", "rubric_criteria", "rubric"]),
            report,
        ),
        improvement_areas: improvement_areas(field(
            record,
            &["improvementAreas", "improvement_areas"],
        )),
        steps: normalize_steps(field(record, &["steps"]), report),
    }
}

/// Flattens strings and `{area, suggestions[]}` records into one deduped
/// list: each record contributes its area, then each suggestion.
pub fn improvement_areas(value: &Value) -> Vec<String> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    let mut flat = Vec::new();
    for item in items {
        match item {
            Value::Object(map) => {
                if let Some(area) = first_string(map, &["area", "title", "name"]) {
                    flat.push(area);
                }
                flat.extend(to_string_array(field(map, &["suggestions"])));
            }
            other => flat.extend(as_non_empty_string(other)),
        }
    }
    unique_strings(flat, MAX_IMPROVEMENT_AREAS)
}

fn normalize_rubric(value: &Value, report: &mut NormalizationReport) -> Vec<RubricCriterion> {
    let mut ids = IdAllocator::new("criterion");
    let mut criteria = Vec::new();
    for (index, criterion) in elements(value, "name", "rubricCriteria", report) {
        let Some(identity) = identify(
            &criterion,
            &["name", "title", "criterion"],
            "Criterion",
            &mut ids,
            index,
            "rubricCriteria",
            report,
        ) else {
            continue;
        };
        let path = format!("{}.maxPoints", element_path("rubricCriteria", index));
        let raw_points = field(&criterion, &["maxPoints", "max_points", "points"]);
        let max_points = match as_finite_number(raw_points) {
            Some(points) => {
                let clamped = points.round().clamp(1.0, f64::from(MAX_POINTS_LIMIT)) as u32;
                if raw_points.as_u64() != Some(u64::from(clamped)) {
                    report.adjusted(path, format!("set to {}", clamped));
                }
                clamped
            }
            None => {
                report.defaulted(path, format!("missing, used {}", DEFAULT_MAX_POINTS));
                DEFAULT_MAX_POINTS
            }
        };
        criteria.push(RubricCriterion {
            id: identity.id,
            name: identity.title,
            description: first_string(&criterion, &["description"]).unwrap_or_default(),
            max_points,
        });
    }
    criteria
}

fn normalize_steps(value: &Value, report: &mut NormalizationReport) -> Vec<ReviseStep> {
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
            first_string(&step, &["instruction", "description", "prompt"]),
            &identity.title,
        );
        steps.push(ReviseStep {
            id: identity.id,
            title: identity.title,
            instruction,
        });
    }
    steps
}
