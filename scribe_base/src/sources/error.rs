use super::SourceKind;
use crate::inventory::InventoryError;
use crate::locator::LocatorError;
use crate::matcher::MatcherError;

/// Source configuration and execution errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("{kind} {field} must be set")]
    MissingField {
        kind: SourceKind,
        field: &'static str,
    },

    #[error("{kind} {field} is not a valid expression: {source}")]
    InvalidPattern {
        kind: SourceKind,
        field: &'static str,
        source: regex::Error,
    },

    #[error("{kind} {field} entry {index} is empty")]
    EmptyEntry {
        kind: SourceKind,
        field: &'static str,
        index: usize,
    },

    #[error(transparent)]
    Locator(#[from] LocatorError),

    #[error(transparent)]
    Matcher(#[from] MatcherError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl SourceError {
    /// Check if this error comes from the source's own configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SourceError::MissingField { .. }
                | SourceError::InvalidPattern { .. }
                | SourceError::EmptyEntry { .. }
        )
    }
}
