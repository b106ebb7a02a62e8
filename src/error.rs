//! Error types for Synheart XP

use thiserror::Error;

/// Errors raised at the engine boundary.
///
/// The allocation math itself never fails; these cover parsing caller input,
/// validating configuration, and encoding reports.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Failed to parse workout payload: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid activity: {0}")]
    InvalidActivity(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
