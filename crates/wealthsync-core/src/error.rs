//! Error types for the record store and deadline handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// No stored record under this id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Record ids become file names, so they are restricted.
    #[error("Invalid id '{0}': use letters, digits, '-', '_' or '.'")]
    InvalidId(String),

    /// A deadline's due date could not be parsed.
    #[error("Deadline {id} has an invalid due date '{raw}'")]
    InvalidDueDate { id: String, raw: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
