//! Derive labs: step-by-step derivations using a fixed set of rules.

use crate::core::coerce::{IdAllocator, as_finite_number, as_record, field, first_string};
use crate::core::report::NormalizationReport;
use crate::templates::common::{element_path, elements, identify, nested};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_PROBLEM: &str = "Derive the result step by step, justifying each step with a rule.";
const DEFAULT_INITIAL_EXPRESSION: &str = "Start from the given premise.";
const DEFAULT_INITIAL_JUSTIFICATION: &str = "Given";
const DEFAULT_EXPECTED_STEPS: u32 = 4;
const MAX_EXPECTED_STEPS: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialStep {
    pub expression: String,
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveStep {
    pub id: String,
    pub title: String,
    pub expression: String,
    pub justification: String,
    pub hint: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeriveData {
    pub problem_statement: String,
    pub available_rules: Vec<Rule>,
    pub initial_step: InitialStep,
    pub expected_steps: u32,
    pub steps: Vec<DeriveStep>,
}

pub fn normalize(value: &Value, report: &mut NormalizationReport) -> DeriveData {
    let record = as_record(value);

    let problem_statement = report.string_or(
        "problemStatement",
        first_string(record, &["problemStatement", "problem", "goal"]),
        DEFAULT_PROBLEM,
    );

    let initial = nested(record, &["initialStep", "initial_step"]);
    let initial_step = InitialStep {
        expression: report.string_or(
            "initialStep.expression",
            first_string(initial, &["expression", "statement"]),
            DEFAULT_INITIAL_EXPRESSION,
        ),
        justification: report.string_or(
            "initialStep.justification",
            first_string(initial, &["justification", "reason"]),
            DEFAULT_INITIAL_JUSTIFICATION,
        ),
    };

    let available_rules = normalize_rules(
        field(record, &["availableRules", "available_rules", "rules"]),
        report,
    );
    let steps = normalize_steps(field(record, &["steps"]), report);
    let expected_steps = normalize_expected_steps(
        field(record, &["expectedSteps", "expected_steps"]),
        steps.len(),
        report,
    );

    DeriveData {
        problem_statement,
        available_rules,
        initial_step,
        expected_steps,
        steps,
    }
}

/// Explicit value, else the step count, else four; always within `[1, 50]`.
fn normalize_expected_steps(
    value: &Value,
    step_count: usize,
    report: &mut NormalizationReport,
) -> u32 {
    if let Some(n) = as_finite_number(value) {
        let clamped = n.round().clamp(1.0, f64::from(MAX_EXPECTED_STEPS)) as u32;
        if value.as_u64() != Some(u64::from(clamped)) {
            report.adjusted("expectedSteps", format!("set to {}", clamped));
        }
        return clamped;
    }
    let fallback = match u32::try_from(step_count) {
        Ok(0) | Err(_) => DEFAULT_EXPECTED_STEPS,
        Ok(n) => n.min(MAX_EXPECTED_STEPS),
    };
    report.defaulted("expectedSteps", format!("missing, used {}", fallback));
    fallback
}

fn normalize_rules(value: &Value, report: &mut NormalizationReport) -> Vec<Rule> {
    let mut ids = IdAllocator::new("rule");
    let mut rules = Vec::new();
    for (index, rule) in elements(value, "name", "availableRules", report) {
        let Some(identity) = identify(
            &rule,
            &["name", "title"],
            "Rule",
            &mut ids,
            index,
            "availableRules",
            report,
        ) else {
            continue;
        };
        rules.push(Rule {
            id: identity.id,
            name: identity.title,
            description: first_string(&rule, &["description", "explanation"]).unwrap_or_default(),
            formula: first_string(&rule, &["formula", "expression", "statement"])
                .unwrap_or_default(),
        });
    }
    rules
}

fn normalize_steps(value: &Value, report: &mut NormalizationReport) -> Vec<DeriveStep> {
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
        let path = element_path("steps", index);
        let expression = first_string(&step, &["expression", "expectedExpression", "statement"])
            .unwrap_or_default();
        let justification = report.string_or(
            &format!("{}.justification", path),
            first_string(&step, &["justification", "rule", "reason"]),
            "Apply a rule",
        );
        steps.push(DeriveStep {
            id: identity.id,
            title: identity.title,
            expression,
            justification,
            hint: first_string(&step, &["hint"]).unwrap_or_default(),
        });
    }
    steps
}
