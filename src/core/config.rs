//! `labgen.toml` configuration.
//!
//! Lookup order: an explicit path (must exist), then `LABGEN_CONFIG`, then
//! `./labgen.toml`. No file at all means built-in defaults.

use crate::core::error::LabgenError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "LABGEN_CONFIG";
pub const CONFIG_FILE: &str = "labgen.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    pub selector_model: String,
    pub content_model: String,
    pub selector_temperature: f32,
    pub content_temperature: f32,
    /// External executable answering chat requests on stdin/stdout.
    pub command: Option<String>,
    pub args: Vec<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            selector_model: "gpt-4o-mini".to_string(),
            content_model: "gpt-4o".to_string(),
            selector_temperature: 0.0,
            content_temperature: 0.7,
            command: None,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub max_concepts: usize,
    pub max_reserved: usize,
    pub token_budget: usize,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            max_concepts: 40,
            max_reserved: 20,
            token_budget: 600,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LabgenConfig {
    pub model: ModelConfig,
    pub logging: LoggingConfig,
    pub scope: ScopeConfig,
}

impl LabgenConfig {
    pub fn validate(&self) -> Result<(), LabgenError> {
        let temperatures = [
            ("model.selector_temperature", self.model.selector_temperature),
            ("model.content_temperature", self.model.content_temperature),
        ];
        for (key, value) in temperatures {
            if !(0.0..=2.0).contains(&value) {
                return Err(LabgenError::ConfigError(format!(
                    "{} must be within [0, 2], got {}",
                    key, value
                )));
            }
        }
        if self.model.selector_model.trim().is_empty() || self.model.content_model.trim().is_empty() {
            return Err(LabgenError::ConfigError(
                "model names must not be empty".to_string(),
            ));
        }
        if self.scope.token_budget == 0 {
            return Err(LabgenError::ConfigError(
                "scope.token_budget must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<LabgenConfig, LabgenError> {
    let config: LabgenConfig =
        toml::from_str(content).map_err(|e| LabgenError::ConfigError(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load using the process environment and working directory.
pub fn load_config(explicit: Option<&Path>) -> Result<LabgenConfig, LabgenError> {
    let env_path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.trim().is_empty());
    let cwd = std::env::current_dir()?;
    load_config_from(explicit, env_path.map(PathBuf::from).as_deref(), &cwd)
}

pub fn load_config_from(
    explicit: Option<&Path>,
    env_path: Option<&Path>,
    cwd: &Path,
) -> Result<LabgenConfig, LabgenError> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(LabgenError::NotFound(format!(
                "config file {}",
                path.display()
            )));
        }
        return read_config(path);
    }

    if let Some(path) = env_path {
        if path.exists() {
            return read_config(path);
        }
        tracing::warn!(path = %path.display(), "{} points at a missing file, ignoring", CONFIG_ENV);
    }

    let local = cwd.join(CONFIG_FILE);
    if local.exists() {
        return read_config(&local);
    }

    // No config file is not an error.
    Ok(LabgenConfig::default())
}

fn read_config(path: &Path) -> Result<LabgenConfig, LabgenError> {
    let content = fs::read_to_string(path)?;
    let config: LabgenConfig = toml::from_str(&content)
        .map_err(|e| LabgenError::ConfigError(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
