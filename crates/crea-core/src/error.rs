//! Error types for Crea

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single field-scoped validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// The main error type for Crea operations
#[derive(Debug, Error)]
pub enum CreaError {
    #[error("Validation error: {}", join_fields(.0))]
    ValidationError(Vec<FieldError>),

    #[error("Generation error: {0}")]
    GenerationError(String),

    #[error("Export error: {0}")]
    ExportError(String),

    #[error("Rasterization error: {0}")]
    RasterError(String),

    #[error("Invalid form transition: cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for Crea operations
pub type Result<T> = std::result::Result<T, CreaError>;

impl CreaError {
    /// Field-level errors, if this is a validation failure
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            CreaError::ValidationError(errors) => errors,
            _ => &[],
        }
    }

    /// Whether the error came from rasterizing or writing an export
    pub fn is_export_failure(&self) -> bool {
        matches!(self, CreaError::ExportError(_) | CreaError::RasterError(_))
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<toml::de::Error> for CreaError {
    fn from(err: toml::de::Error) -> Self {
        CreaError::TomlParseError(err.to_string())
    }
}
