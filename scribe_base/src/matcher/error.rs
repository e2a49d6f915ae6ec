use std::io;
use std::path::PathBuf;

/// Content matcher errors
#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid content expression '{expression}': {source}")]
    InvalidExpression {
        expression: String,
        source: regex::Error,
    },

    #[error("Cannot open '{}': {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed reading '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
}

impl MatcherError {
    /// I/O error kind for open/read failures
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            MatcherError::InvalidExpression { .. } => None,
            MatcherError::Open { source, .. } | MatcherError::Read { source, .. } => {
                Some(source.kind())
            }
        }
    }

    /// Check if this is a per-file failure a best-effort scan may skip
    pub fn is_file_error(&self) -> bool {
        self.io_kind().is_some()
    }
}
