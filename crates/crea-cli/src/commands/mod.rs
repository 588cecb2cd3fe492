//! CLI command implementations

pub mod generate;
pub mod providers;
pub mod session;
pub mod templates;

use crea_core::CreaError;

/// Turn field-level validation failures into a readable error
pub fn describe_error(err: CreaError) -> anyhow::Error {
    if let CreaError::ValidationError(fields) = &err {
        let lines: Vec<String> = fields.iter().map(|f| format!("  {}", f)).collect();
        return anyhow::anyhow!("Invalid input:\n{}", lines.join("\n"));
    }
    err.into()
}
