//! Error types for loading fleet and request data.
//!
//! Scheduling outcomes (infeasible, unbounded, solver failure) are not errors;
//! they are values produced by the engine. [`CoreError`] only covers problems
//! reading or validating the inputs themselves.

use thiserror::Error;

/// Error raised while reading or validating engine inputs.
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Parse(err.to_string())
    }
}
