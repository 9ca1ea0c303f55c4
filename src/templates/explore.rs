//! Explore labs: vary parameters of a model and reason about the effect.

use crate::core::coerce::{
    IdAllocator, as_finite_number, as_identifier, as_record, field, first_string,
    to_string_array, unique_strings,
};
use crate::core::report::NormalizationReport;
use crate::templates::common::{element_path, elements};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_SCENARIO: &str =
    "Adjust the parameters and observe how the outcome changes.";
const MAX_QUESTIONS: usize = 8;
/// Parameter bounds stay inside this magnitude so `max` is always finite.
const BOUND_LIMIT: f64 = 1e300;
const FALLBACK_QUESTIONS: [&str; 3] = [
    "What happens when you increase each parameter?",
    "Which parameter has the largest effect on the outcome?",
    "Can you predict the outcome before changing a value?",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub id: String,
    pub name: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default_value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreData {
    pub scenario: String,
    pub parameters: Vec<Parameter>,
    pub guiding_questions: Vec<String>,
}

pub fn normalize(value: &Value, report: &mut NormalizationReport) -> ExploreData {
    let record = as_record(value);

    let scenario = report.string_or(
        "scenario",
        first_string(record, &["scenario", "description", "context"]),
        DEFAULT_SCENARIO,
    );
    let parameters = normalize_parameters(
        field(record, &["parameters", "params", "variables"]),
        report,
    );

    let mut guiding_questions = unique_strings(
        to_string_array(field(record, &["guidingQuestions", "guiding_questions", "questions"])),
        MAX_QUESTIONS,
    );
    if guiding_questions.is_empty() {
        report.defaulted("guidingQuestions", "empty, used generic questions");
        guiding_questions = FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect();
    }

    ExploreData {
        scenario,
        parameters,
        guiding_questions,
    }
}

fn normalize_parameters(value: &Value, report: &mut NormalizationReport) -> Vec<Parameter> {
    let mut ids = IdAllocator::new("param");
    let mut parameters = Vec::new();
    for (index, param) in elements(value, "name", "parameters", report) {
        let path = element_path("parameters", index);
        let explicit = as_identifier(field(&param, &["id", "key"]));
        let name = first_string(&param, &["name", "label", "title"]);
        let Some(id) = ids.assign(explicit.clone(), name.as_deref(), index + 1) else {
            report.dropped(path, "no id and no name");
            continue;
        };
        if explicit.as_deref().is_some_and(|e| e != id) {
            report.adjusted(format!("{}.id", path), format!("duplicate id renamed to '{}'", id));
        }
        let name = match name {
            Some(name) => name,
            None => {
                report.defaulted(format!("{}.name", path), "missing, used the id");
                id.clone()
            }
        };

        let step = match as_finite_number(field(&param, &["step"])) {
            Some(s) if s > 0.0 => s,
            Some(_) => {
                report.adjusted(format!("{}.step", path), "not positive, used 1");
                1.0
            }
            None => {
                report.defaulted(format!("{}.step", path), "missing, used 1");
                1.0
            }
        };
        let mut min = report.number_or(
            &format!("{}.min", path),
            as_finite_number(field(&param, &["min", "minimum"])),
            0.0,
        );
        if min.abs() > BOUND_LIMIT {
            min = min.clamp(-BOUND_LIMIT, BOUND_LIMIT);
            report.adjusted(format!("{}.min", path), format!("out of range, clamped to {}", min));
        }
        let max = match as_finite_number(field(&param, &["max", "maximum"])) {
            Some(max) if max > min => max,
            Some(_) => {
                let max = above(min, &[min + step.max(1.0)]);
                report.adjusted(format!("{}.max", path), format!("not above min, set to {}", max));
                max
            }
            None => {
                let max = above(min, &[min + 10.0 * step, min + step]);
                report.defaulted(format!("{}.max", path), format!("missing, used {}", max));
                max
            }
        };
        let default_value = match as_finite_number(field(
            &param,
            &["defaultValue", "default_value", "default", "value"],
        )) {
            Some(v) if (min..=max).contains(&v) => v,
            Some(v) => {
                let clamped = v.clamp(min, max);
                report.adjusted(
                    format!("{}.defaultValue", path),
                    format!("clamped to {}", clamped),
                );
                clamped
            }
            None => {
                report.defaulted(format!("{}.defaultValue", path), "missing, used min");
                min
            }
        };

        parameters.push(Parameter {
            id,
            name,
            min,
            max,
            step,
            default_value,
            unit: first_string(&param, &["unit", "units"]).unwrap_or_default(),
        });
    }
    parameters
}

/// First candidate that is finite and above `min`, else the next float above `min`.
fn above(min: f64, candidates: &[f64]) -> f64 {
    candidates
        .iter()
        .copied()
        .find(|c| c.is_finite() && *c > min)
        .unwrap_or_else(|| min.next_up())
}
