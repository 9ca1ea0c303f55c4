//! The LabSpec data model.
//!
//! A `LabSpec` is the persist-ready description of one generated learning
//! activity. It is built once per generation request and never mutated
//! afterwards; callers that edit a stored lab re-normalize it instead.

use crate::core::canonical;
use crate::core::coerce::{Record, as_non_empty_string, as_record, field, first_string};
use crate::core::error::LabgenError;
use crate::core::report::NormalizationReport;
use crate::templates::{
    analyze::AnalyzeData, build::BuildData, derive::DeriveData, explain::ExplainData,
    explore::ExploreData, normalize_with_report, revise::ReviseData,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// One of the six fixed pedagogical activity shapes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Analyze,
    Build,
    Derive,
    Explain,
    Explore,
    Revise,
}

impl TemplateType {
    pub const ALL: [TemplateType; 6] = [
        TemplateType::Analyze,
        TemplateType::Build,
        TemplateType::Derive,
        TemplateType::Explain,
        TemplateType::Explore,
        TemplateType::Revise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Analyze => "analyze",
            TemplateType::Build => "build",
            TemplateType::Derive => "derive",
            TemplateType::Explain => "explain",
            TemplateType::Explore => "explore",
            TemplateType::Revise => "revise",
        }
    }

    /// Title-cased name, used as the last-resort topic.
    pub fn title(&self) -> &'static str {
        match self {
            TemplateType::Analyze => "Analyze",
            TemplateType::Build => "Build",
            TemplateType::Derive => "Derive",
            TemplateType::Explain => "Explain",
            TemplateType::Explore => "Explore",
            TemplateType::Revise => "Revise",
        }
    }

    /// Case-insensitive parse of a discriminant string.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.as_str() == key)
    }

    pub fn untitled_lab(&self) -> String {
        format!("Untitled {} Lab", self.title())
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Languages a Build or Explain lab may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Javascript,
    Typescript,
    Python,
    Java,
    Cpp,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
            Language::Python => "python",
            Language::Java => "java",
            Language::Cpp => "cpp",
        }
    }

    /// Whitelist lookup; anything outside it is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" => Some(Language::Javascript),
            "typescript" | "ts" => Some(Language::Typescript),
            "python" | "py" => Some(Language::Python),
            "java" => Some(Language::Java),
            "cpp" | "c++" => Some(Language::Cpp),
            _ => None,
        }
    }

    pub fn line_comment(&self) -> &'static str {
        match self {
            Language::Python => "#",
            _ => "//",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The typed template content; the variant always matches `templateType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "templateType",
    content = "templateData",
    rename_all = "lowercase"
)]
pub enum TemplatePayload {
    Analyze(AnalyzeData),
    Build(BuildData),
    Derive(DeriveData),
    Explain(ExplainData),
    Explore(ExploreData),
    Revise(ReviseData),
}

impl TemplatePayload {
    pub fn template_type(&self) -> TemplateType {
        match self {
            TemplatePayload::Analyze(_) => TemplateType::Analyze,
            TemplatePayload::Build(_) => TemplateType::Build,
            TemplatePayload::Derive(_) => TemplateType::Derive,
            TemplatePayload::Explain(_) => TemplateType::Explain,
            TemplatePayload::Explore(_) => TemplateType::Explore,
            TemplatePayload::Revise(_) => TemplateType::Revise,
        }
    }

    /// The payload as the untyped `templateData` value.
    pub fn data_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            TemplatePayload::Analyze(d) => serde_json::to_value(d),
            TemplatePayload::Build(d) => serde_json::to_value(d),
            TemplatePayload::Derive(d) => serde_json::to_value(d),
            TemplatePayload::Explain(d) => serde_json::to_value(d),
            TemplatePayload::Explore(d) => serde_json::to_value(d),
            TemplatePayload::Revise(d) => serde_json::to_value(d),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabSpec {
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub template: TemplatePayload,
    pub difficulty: Difficulty,
    pub estimated_duration_minutes: u32,
    pub topics: Vec<String>,
}

/// Values used when the content itself does not carry a canonical field.
#[derive(Debug, Clone, Default)]
pub struct SpecDefaults {
    pub difficulty: Option<Difficulty>,
    pub duration_minutes: Option<u32>,
    /// Topic candidates tried before the final `Practice` fallback.
    pub topics: Vec<String>,
}

impl LabSpec {
    pub fn template_type(&self) -> TemplateType {
        self.template.template_type()
    }

    /// Re-normalize a stored or edited LabSpec record.
    ///
    /// Only the `templateType` discriminant is required; every other field
    /// goes through the same total normalization as a fresh generation.
    pub fn from_value(value: &Value) -> Result<(LabSpec, NormalizationReport), LabgenError> {
        let record = as_record(value);
        let raw_type = field(record, &["templateType", "template_type"]);
        let template_type = as_non_empty_string(raw_type)
            .and_then(|s| TemplateType::parse(&s))
            .ok_or_else(|| {
                LabgenError::ValidationError(format!(
                    "templateType must be one of analyze|build|derive|explain|explore|revise, got {}",
                    raw_type
                ))
            })?;

        Ok(Self::assemble(
            template_type,
            field(record, &["title", "labTitle"]),
            record,
            field(record, &["templateData", "template_data", "data"]),
            &SpecDefaults::default(),
        ))
    }

    /// Build a LabSpec from an untyped record: `title` is the raw title
    /// value, `data` the raw template data and `record` carries the
    /// description and canonical fields.
    pub fn assemble(
        template_type: TemplateType,
        title: &Value,
        record: &Record,
        data: &Value,
        defaults: &SpecDefaults,
    ) -> (LabSpec, NormalizationReport) {
        let mut report = NormalizationReport::new();
        let title = report.string_or(
            "title",
            as_non_empty_string(title),
            &template_type.untitled_lab(),
        );
        let description =
            first_string(record, &["description", "labDescription"]).unwrap_or_default();

        let (template, data_report) = normalize_with_report(template_type, data);
        report.absorb("templateData", data_report);

        let raw_difficulty = field(record, &["difficulty"]);
        let difficulty = match raw_difficulty {
            Value::Null => {
                let fallback = defaults.difficulty.unwrap_or_default();
                report.defaulted("difficulty", format!("missing, used '{}'", fallback));
                fallback
            }
            raw => {
                let difficulty = canonical::normalize_difficulty(raw);
                if !canonical::is_canonical_difficulty(raw) {
                    report.adjusted("difficulty", format!("mapped to '{}'", difficulty));
                }
                difficulty
            }
        };

        let raw_duration = field(
            record,
            &["estimatedDurationMinutes", "estimated_duration_minutes", "duration"],
        );
        let estimated_duration_minutes = match raw_duration {
            Value::Null => {
                let minutes = canonical::normalize_duration(&Value::from(
                    defaults
                        .duration_minutes
                        .unwrap_or(canonical::DEFAULT_DURATION_MINUTES),
                ));
                report.defaulted(
                    "estimatedDurationMinutes",
                    format!("missing, used {}", minutes),
                );
                minutes
            }
            raw => {
                let minutes = canonical::normalize_duration(raw);
                if raw.as_u64() != Some(u64::from(minutes)) {
                    report.adjusted("estimatedDurationMinutes", format!("set to {}", minutes));
                }
                minutes
            }
        };

        let explicit_topics = canonical::topic_candidates(field(record, &["topics"]));
        let topics = if explicit_topics.is_empty() {
            let topics = canonical::normalize_topics(defaults.topics.clone());
            report.defaulted("topics", format!("empty, used {:?}", topics));
            topics
        } else {
            canonical::normalize_topics(explicit_topics)
        };

        (
            LabSpec {
                title,
                description,
                template,
                difficulty,
                estimated_duration_minutes,
                topics,
            },
            report,
        )
    }

    pub fn canonical_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn content_hash_hex(&self) -> Result<String, serde_json::Error> {
        let bytes = self.canonical_json_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}
