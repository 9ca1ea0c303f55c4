//! Lab generation: select a template type, generate content, normalize.
//!
//! Two strictly sequential model calls. Any failure in either call, or in
//! parsing either response, aborts the whole generation with a
//! [`GenerationError`]; nothing is retried and no partial LabSpec is
//! returned. Field-level problems in the content are absorbed by
//! normalization and surface only in the [`NormalizationReport`].

use crate::core::canonical::{self, DEFAULT_DURATION_MINUTES};
use crate::core::coerce::{Record, as_non_empty_string, field};
use crate::core::config::ModelConfig;
use crate::core::extract::{preview, try_parse_json};
use crate::core::lab::{Difficulty, LabSpec, SpecDefaults, TemplateType};
use crate::core::model::{ChatRequest, ModelClient, ModelError};
use crate::core::prompts::{self, PromptInputs};
use crate::core::report::NormalizationReport;
use crate::core::time::new_event_id;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

const PREVIEW_CHARS: usize = 120;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("model call failed: {0}")]
    ModelCallFailed(#[from] ModelError),
    #[error("template selection could not be parsed: {0}")]
    SelectionParseFailed(String),
    #[error("unsupported template type '{0}'")]
    UnsupportedTemplateType(String),
    #[error("lab content could not be parsed: {0}")]
    ContentParseFailed(String),
}

/// States of one generation, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStage {
    SelectingTemplate,
    ParsingSelection,
    GeneratingContent,
    ParsingContent,
    Normalizing,
    Done,
}

impl GenerationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStage::SelectingTemplate => "selecting_template",
            GenerationStage::ParsingSelection => "parsing_selection",
            GenerationStage::GeneratingContent => "generating_content",
            GenerationStage::ParsingContent => "parsing_content",
            GenerationStage::Normalizing => "normalizing",
            GenerationStage::Done => "done",
        }
    }
}

impl fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the caller asks for.
#[derive(Debug, Clone, Default)]
pub struct LabRequest {
    pub goal: String,
    pub context: Option<String>,
    pub user_level: Option<Difficulty>,
    pub duration_minutes: Option<u32>,
    /// Rendered scope-context block, see `core::scope`.
    pub scope_block: Option<String>,
}

impl LabRequest {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            ..Self::default()
        }
    }

    fn prompt_inputs(&self) -> PromptInputs<'_> {
        PromptInputs {
            goal: &self.goal,
            context: self.context.as_deref(),
            level: self.user_level.unwrap_or_default(),
            duration_minutes: self.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES),
            scope_block: self.scope_block.as_deref(),
        }
    }
}

/// A successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedLab {
    pub request_id: String,
    pub spec: LabSpec,
    pub report: NormalizationReport,
}

/// Runs generations against a borrowed model client.
pub struct LabGenerator<'a> {
    client: &'a dyn ModelClient,
    config: &'a ModelConfig,
}

impl<'a> LabGenerator<'a> {
    pub fn new(client: &'a dyn ModelClient, config: &'a ModelConfig) -> Self {
        Self { client, config }
    }

    pub fn generate(&self, request: &LabRequest) -> Result<GeneratedLab, GenerationError> {
        let request_id = new_event_id();
        info!(request_id = %request_id, goal = %preview(&request.goal, 80), "generation started");

        let result = self.run(request, &request_id);
        match &result {
            Ok(lab) => info!(
                request_id = %request_id,
                template_type = %lab.spec.template_type(),
                fallbacks = lab.report.len(),
                "generation finished"
            ),
            Err(err) => warn!(request_id = %request_id, error = %err, "generation failed"),
        }
        result
    }

    fn run(&self, request: &LabRequest, request_id: &str) -> Result<GeneratedLab, GenerationError> {
        let template_type = self.select_template_type(request)?;
        let content = self.generate_content(template_type, request)?;

        debug!(stage = %GenerationStage::Normalizing, request_id, "normalizing content");
        let (spec, report) = assemble(template_type, &content, request);
        debug!(stage = %GenerationStage::Done, request_id, report = %report.summary(5), "normalized");

        Ok(GeneratedLab {
            request_id: request_id.to_string(),
            spec,
            report,
        })
    }

    /// Model call 1: ask which template shape fits the goal.
    pub fn select_template_type(&self, request: &LabRequest) -> Result<TemplateType, GenerationError> {
        let chat = ChatRequest {
            model: self.config.selector_model.clone(),
            messages: prompts::selector_messages(&request.prompt_inputs()),
            temperature: Some(self.config.selector_temperature),
        };
        debug!(
            stage = %GenerationStage::SelectingTemplate,
            prompt_tokens = prompts::estimate_tokens(&chat.text()),
            "requesting template selection"
        );
        let text = self.client.complete(&chat)?;

        debug!(stage = %GenerationStage::ParsingSelection, "parsing selection");
        parse_selection(&text)
    }

    /// Model call 2: generate the lab content for the chosen shape.
    pub fn generate_content(
        &self,
        template_type: TemplateType,
        request: &LabRequest,
    ) -> Result<Record, GenerationError> {
        let chat = ChatRequest {
            model: self.config.content_model.clone(),
            messages: prompts::content_messages(template_type, &request.prompt_inputs()),
            temperature: Some(self.config.content_temperature),
        };
        debug!(
            stage = %GenerationStage::GeneratingContent,
            template_type = %template_type,
            prompt_tokens = prompts::estimate_tokens(&chat.text()),
            "requesting lab content"
        );
        let text = self.client.complete(&chat)?;

        debug!(stage = %GenerationStage::ParsingContent, "parsing content");
        parse_content(&text)
    }
}

/// Parse the selector response into a template type.
pub fn parse_selection(text: &str) -> Result<TemplateType, GenerationError> {
    let value =
        try_parse_json(text).map_err(|f| GenerationError::SelectionParseFailed(f.to_string()))?;
    let Value::Object(record) = &value else {
        return Err(GenerationError::SelectionParseFailed(format!(
            "expected a JSON object, got '{}'",
            preview(&value.to_string(), PREVIEW_CHARS)
        )));
    };
    let raw = field(record, &["template_type", "templateType"]);
    let Some(name) = as_non_empty_string(raw) else {
        return Err(GenerationError::SelectionParseFailed(format!(
            "missing template_type in '{}'",
            preview(&value.to_string(), PREVIEW_CHARS)
        )));
    };
    TemplateType::parse(&name).ok_or(GenerationError::UnsupportedTemplateType(name))
}

/// Parse the content response; it must be an object with `labTitle` and `data`.
pub fn parse_content(text: &str) -> Result<Record, GenerationError> {
    let value =
        try_parse_json(text).map_err(|f| GenerationError::ContentParseFailed(f.to_string()))?;
    let Value::Object(record) = value else {
        return Err(GenerationError::ContentParseFailed(format!(
            "expected a JSON object, got '{}'",
            preview(&value.to_string(), PREVIEW_CHARS)
        )));
    };
    for required in ["labTitle", "data"] {
        if record.get(required).is_none_or(Value::is_null) {
            return Err(GenerationError::ContentParseFailed(format!(
                "missing {} in '{}'",
                required,
                preview(&Value::Object(record.clone()).to_string(), PREVIEW_CHARS)
            )));
        }
    }
    Ok(record)
}

/// Normalize parsed content into a LabSpec.
///
/// Topics fall back from the content's own list, to keywords matched in
/// the goal, to the template type name.
pub fn assemble(
    template_type: TemplateType,
    content: &Record,
    request: &LabRequest,
) -> (LabSpec, NormalizationReport) {
    let mut fallback_topics = canonical::match_topics(&request.goal);
    if fallback_topics.is_empty() {
        fallback_topics.push(template_type.title().to_string());
    }
    let defaults = SpecDefaults {
        difficulty: request.user_level,
        duration_minutes: request.duration_minutes,
        topics: fallback_topics,
    };
    LabSpec::assemble(
        template_type,
        field(content, &["labTitle"]),
        content,
        field(content, &["data"]),
        &defaults,
    )
}
