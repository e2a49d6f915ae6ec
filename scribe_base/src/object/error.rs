use crate::sources::{SourceError, SourceKind};

/// Test object validation and preparation errors
#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    #[error("an object in document has no identifier")]
    MissingIdentifier,

    #[error("{object}: no valid source interface ({})", describe_declared(.declared))]
    NoValidInterface {
        object: String,
        declared: Vec<SourceKind>,
    },

    #[error("{object}: object has no valid interface")]
    NoInterface { object: String },

    #[error("{object}: {source}")]
    Source { object: String, source: SourceError },

    #[error("{object}: chain reference '{reference}' does not name an object")]
    UnresolvedChain { object: String, reference: String },

    #[error("{object}: chain reference '{reference}' is not a chain member")]
    NotChainMember { object: String, reference: String },
}

impl ObjectError {
    /// Identifier of the failing object, if it has one
    pub fn object(&self) -> Option<&str> {
        match self {
            ObjectError::MissingIdentifier => None,
            ObjectError::NoValidInterface { object, .. }
            | ObjectError::NoInterface { object }
            | ObjectError::Source { object, .. }
            | ObjectError::UnresolvedChain { object, .. }
            | ObjectError::NotChainMember { object, .. } => Some(object),
        }
    }
}

fn describe_declared(declared: &[SourceKind]) -> String {
    if declared.is_empty() {
        return "none declared".to_string();
    }
    let names: Vec<&str> = declared.iter().map(SourceKind::as_str).collect();
    format!("declared {}", names.join(", "))
}
