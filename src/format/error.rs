//! Error types for import and export.

use thiserror::Error;

/// Errors that can occur during format operations.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The payload was not syntactically valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload parsed, but its top level is not an array of annotations
    #[error("expected a top-level JSON array of annotations")]
    NotAnArray,

    /// No exporter is registered under the requested name
    #[error("Unsupported export format: {format}")]
    Unsupported {
        /// The format name that was requested
        format: String,
    },
}

impl FormatError {
    /// Create an unsupported-format error naming the requested format.
    pub fn unsupported(format: impl Into<String>) -> Self {
        FormatError::Unsupported {
            format: format.into(),
        }
    }
}
