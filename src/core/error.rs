use crate::core::model::ModelError;
use crate::core::pipeline::GenerationError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabgenError {
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("Model client error: {0}")]
    Model(#[from] ModelError),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
