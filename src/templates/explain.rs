//! Explain labs: read an artifact (usually code) and explain it.

use crate::core::coerce::{IdAllocator, as_record, field, first_string, to_string_array, unique_strings};
use crate::core::lab::Language;
use crate::core::report::NormalizationReport;
use crate::templates::build::normalize_language;
use crate::templates::common::{element_path, elements, identify, nested};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_ARTIFACT_TITLE: &str = "Code Sample";
const MAX_OBJECTIVES: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub title: String,
    pub description: String,
    pub code: String,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainStep {
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainData {
    pub artifact: Artifact,
    pub learning_objectives: Vec<String>,
    pub steps: Vec<ExplainStep>,
}

pub fn normalize(value: &Value, report: &mut NormalizationReport) -> ExplainData {
    let record = as_record(value);
    let artifact = nested(record, &["artifact", "codeArtifact"]);

    let mut language_report = NormalizationReport::new();
    let language = normalize_language(
        field(artifact, &["language"]),
        &mut language_report,
    );
    report.absorb("artifact", language_report);

    let code = match field(artifact, &["code", "content", "source"]) {
        Value::String(code) => code.clone(),
        _ => String::new(),
    };

    ExplainData {
        artifact: Artifact {
            title: report.string_or(
                "artifact.title",
                first_string(artifact, &["title", "name"]),
                DEFAULT_ARTIFACT_TITLE,
            ),
            description: first_string(artifact, &["description"]).unwrap_or_default(),
            code,
            language,
        },
        learning_objectives: unique_strings(
            to_string_array(field(record, &["learningObjectives", "learning_objectives", "objectives"])),
            MAX_OBJECTIVES,
        ),
        steps: normalize_steps(field(record, &["steps"]), report),
    }
}

fn normalize_steps(value: &Value, report: &mut NormalizationReport) -> Vec<ExplainStep> {
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
        let prompt = report.string_or(
            &format!("{}.prompt", element_path("steps", index)),
            first_string(&step, &["prompt", "question", "instruction", "description"]),
            &identity.title,
        );
        steps.push(ExplainStep {
            id: identity.id,
            title: identity.title,
            prompt,
            hint: first_string(&step, &["hint"]).unwrap_or_default(),
        });
    }
    steps
}
