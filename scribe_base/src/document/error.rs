use crate::object::ObjectError;
use std::path::PathBuf;

/// Document loading, validation and preparation errors
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Failed to read document {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate object identifier '{object}'")]
    DuplicateObject { object: String },

    #[error(transparent)]
    Object(#[from] ObjectError),

    #[error("preparation worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

impl DocumentError {
    /// True for errors caused by the document's content rather than the host
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DocumentError::Parse(_) | DocumentError::DuplicateObject { .. } | DocumentError::Object(_)
        )
    }
}
