//! Build labs: write code against a set of test cases.

use crate::core::coerce::{
    IdAllocator, Record, as_bool, as_identifier, as_non_empty_string, as_record, as_text, field,
    first_string, to_string_array, unique_strings,
};
use crate::core::lab::Language;
use crate::core::report::NormalizationReport;
use crate::templates::common::{element_path, elements, identify};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_PROBLEM: &str = "Implement a solution that passes every test case.";
const DEFAULT_TEST_NAME: &str = "Example test";
const MAX_HINTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetType {
    Editor,
    Checklist,
    MultipleChoice,
    Reflection,
    TestRunner,
}

impl WidgetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Editor => "editor",
            WidgetType::Checklist => "checklist",
            WidgetType::MultipleChoice => "multiple-choice",
            WidgetType::Reflection => "reflection",
            WidgetType::TestRunner => "test-runner",
        }
    }

    /// Whitelist lookup. `text-input` is an older name for the editor.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "editor" | "text-input" => Some(WidgetType::Editor),
            "checklist" => Some(WidgetType::Checklist),
            "multiple-choice" => Some(WidgetType::MultipleChoice),
            "reflection" => Some(WidgetType::Reflection),
            "test-runner" => Some(WidgetType::TestRunner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    #[serde(rename = "type")]
    pub widget_type: WidgetType,
    pub label: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub name: String,
    pub input: String,
    pub expected_output: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStep {
    pub id: String,
    pub title: String,
    pub instruction: String,
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildData {
    pub problem_statement: String,
    pub language: Language,
    pub initial_code: String,
    pub test_cases: Vec<TestCase>,
    pub steps: Vec<BuildStep>,
    pub hints: Vec<String>,
}

pub fn normalize(value: &Value, report: &mut NormalizationReport) -> BuildData {
    let record = as_record(value);

    let problem_statement = report.string_or(
        "problemStatement",
        first_string(record, &["problemStatement", "problem", "description", "prompt"]),
        DEFAULT_PROBLEM,
    );
    let language = normalize_language(field(record, &["language"]), report);

    let initial_code = match field(record, &["initialCode", "starterCode", "initial_code"]) {
        Value::String(code) if !code.trim().is_empty() => code.clone(),
        _ => {
            report.defaulted("initialCode", "missing, used a comment stub");
            format!("{} Write your solution here\n", language.line_comment())
        }
    };

    let mut test_cases = normalize_test_cases(
        field(record, &["testCases", "test_cases", "tests"]),
        report,
    );
    if test_cases.is_empty() {
        report.defaulted("testCases", "empty, synthesized one example test");
        test_cases.push(TestCase {
            id: "test-1".to_string(),
            name: DEFAULT_TEST_NAME.to_string(),
            input: String::new(),
            expected_output: String::new(),
            hidden: false,
        });
    }

    BuildData {
        problem_statement,
        language,
        initial_code,
        test_cases,
        steps: normalize_steps(field(record, &["steps"]), report),
        hints: unique_strings(to_string_array(field(record, &["hints"])), MAX_HINTS),
    }
}

/// Whitelisted language, defaulting to javascript. Shared with Explain.
pub(crate) fn normalize_language(value: &Value, report: &mut NormalizationReport) -> Language {
    let Some(raw) = as_non_empty_string(value) else {
        report.defaulted("language", "missing, used 'javascript'");
        return Language::default();
    };
    match Language::parse(&raw) {
        Some(language) => {
            if language.as_str() != raw {
                report.adjusted("language", format!("'{}' mapped to '{}'", raw, language));
            }
            language
        }
        None => {
            report.adjusted(
                "language",
                format!("'{}' is not supported, used 'javascript'", raw),
            );
            Language::default()
        }
    }
}

fn normalize_test_cases(value: &Value, report: &mut NormalizationReport) -> Vec<TestCase> {
    let mut ids = IdAllocator::new("test");
    let mut cases = Vec::new();
    for (index, case) in elements(value, "name", "testCases", report) {
        let path = element_path("testCases", index);
        let input = field(&case, &["input", "inputs", "args"]);
        let expected = field(
            &case,
            &["expectedOutput", "expected_output", "expected", "output"],
        );

        let mut name = first_string(&case, &["name", "title", "description"]);
        if name.is_none() && (!input.is_null() || !expected.is_null()) {
            let fallback = format!("Test case {}", index + 1);
            report.defaulted(format!("{}.name", path), format!("missing, used '{}'", fallback));
            name = Some(fallback);
        }

        let explicit = as_identifier(field(&case, &["id"]));
        let Some(id) = ids.assign(explicit.clone(), name.as_deref(), index + 1) else {
            report.dropped(path, "no id, name or data");
            continue;
        };
        if explicit.as_deref().is_some_and(|e| e != id) {
            report.adjusted(format!("{}.id", path), format!("duplicate id renamed to '{}'", id));
        }
        let name = match name {
            Some(name) => name,
            None => {
                let fallback = format!("Test case {}", index + 1);
                report.defaulted(format!("{}.name", path), format!("missing, used '{}'", fallback));
                fallback
            }
        };

        cases.push(TestCase {
            id,
            name,
            input: as_text(input),
            expected_output: as_text(expected),
            hidden: as_bool(field(&case, &["hidden", "isHidden"]), false),
        });
    }
    cases
}

fn normalize_steps(value: &Value, report: &mut NormalizationReport) -> Vec<BuildStep> {
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
        let instruction = report.string_or(
            &format!("{}.instruction", path),
            first_string(&step, &["instruction", "description", "prompt", "content"]),
            &identity.title,
        );
        let widgets = normalize_widgets(&step, &format!("{}.widgets", path), report);
        steps.push(BuildStep {
            id: identity.id,
            title: identity.title,
            instruction,
            widgets,
        });
    }
    steps
}

/// Unrecognized widget types are dropped, never defaulted.
fn normalize_widgets(step: &Record, path: &str, report: &mut NormalizationReport) -> Vec<Widget> {
    let mut widgets = Vec::new();
    for (index, widget) in elements(field(step, &["widgets"]), "type", path, report) {
        let element = element_path(path, index);
        let Some(raw) = first_string(&widget, &["type", "kind"]) else {
            report.dropped(element, "widget has no type");
            continue;
        };
        let Some(widget_type) = WidgetType::parse(&raw) else {
            report.dropped(element, format!("unknown widget type '{}'", raw));
            continue;
        };
        if widget_type.as_str() != raw {
            report.adjusted(
                format!("{}.type", element),
                format!("'{}' mapped to '{}'", raw, widget_type.as_str()),
            );
        }
        widgets.push(Widget {
            widget_type,
            label: first_string(&widget, &["label", "title", "prompt"]).unwrap_or_default(),
            options: to_string_array(field(&widget, &["options", "choices", "items"])),
        });
    }
    widgets
}
