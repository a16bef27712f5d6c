//! Error types for Lexibench

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Manifest parse error (line {line}): {message}")]
    ManifestParse { line: usize, message: String },

    #[error("Invalid image descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown experiment: {0}")]
    UnknownExperiment(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Interrupted")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, BenchError>;
