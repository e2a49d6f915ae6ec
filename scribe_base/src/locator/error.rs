use std::path::PathBuf;

/// File locator errors
#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    #[error("locator has already been executed")]
    AlreadyExecuted,

    #[error("Invalid file name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// Only raised in strict traversal mode
    #[error("Cannot read directory '{}': {source}", .path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl LocatorError {
    /// Check if this error is a caller protocol violation rather than an environment failure
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, LocatorError::AlreadyExecuted)
    }
}
