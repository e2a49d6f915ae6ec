//! # Source Checks
//!
//! Every check kind implements [`GenericSource`]. A test object holds exactly
//! one of them and drives it through validate, chain firing and preparation.
//!
//! # Contract
//!
//! - `validate` never performs I/O.
//! - `prepare` performs the check and may be expensive. Chain members are
//!   never prepared.
//! - `criteria` is read-only and repeatable; before preparation it only holds
//!   evidence that needs no I/O plus anything merged from chains.
//! - `fire_chains` reads the evidence of the objects named by
//!   `chain_dependencies`; the owner folds it back in with `merge_criteria`.

pub mod error;
pub mod file_content;
pub mod file_name;
pub mod package;
pub mod raw;

pub use error::SourceError;
pub use file_content::FileContentSource;
pub use file_name::FileNameSource;
pub use package::PackageSource;
pub use raw::{RawIdentifier, RawSource};

use crate::config::ScribeConfig;
use crate::inventory::PackageInventory;
use crate::logging::codes;
use crate::log_warning;
use crate::object::TestObject;
use crate::types::{EvaluationCriteria, ScanDiagnostics, Variable};
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Check kinds, in resolution precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Package,
    FileContent,
    FileName,
    Raw,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Package => "package",
            SourceKind::FileContent => "filecontent",
            SourceKind::FileName => "filename",
            SourceKind::Raw => "raw",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Object lookup supplied by the owning document
pub trait ObjectResolver {
    fn find_object(&self, identifier: &str) -> Option<&TestObject>;

    fn variables(&self) -> &[Variable];
}

/// Everything a source may use while preparing
#[derive(Clone, Copy)]
pub struct PrepareContext<'a> {
    pub config: &'a ScribeConfig,
    pub inventory: &'a dyn PackageInventory,
    pub variables: &'a [Variable],
}

impl<'a> PrepareContext<'a> {
    pub fn new(
        config: &'a ScribeConfig,
        inventory: &'a dyn PackageInventory,
        variables: &'a [Variable],
    ) -> Self {
        Self {
            config,
            inventory,
            variables,
        }
    }
}

impl fmt::Debug for PrepareContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrepareContext")
            .field("config", self.config)
            .field("inventory", &self.inventory.inventory_id())
            .field("variables", &self.variables.len())
            .finish()
    }
}

/// Contract shared by every source check kind
pub trait GenericSource: Send + Sync + fmt::Debug {
    fn kind(&self) -> SourceKind;

    /// Check configuration completeness; no I/O
    fn validate(&self) -> Result<(), SourceError>;

    /// Run the check and replace accumulated evidence
    fn prepare(&mut self, context: &PrepareContext<'_>) -> Result<(), SourceError>;

    /// True if this source only exists to be imported by another object
    fn is_chain(&self) -> bool {
        false
    }

    fn expand_variables(&mut self, variables: &[Variable]);

    /// Own evidence followed by merged chain evidence
    fn criteria(&self) -> Vec<EvaluationCriteria>;

    fn merge_criteria(&mut self, extra: Vec<EvaluationCriteria>);

    /// Identifiers of the objects this source imports
    fn chain_dependencies(&self) -> &[String] {
        &[]
    }

    /// Collect evidence from every chain dependency, in declaration order
    fn fire_chains(&self, resolver: &dyn ObjectResolver) -> Vec<EvaluationCriteria> {
        let mut collected = Vec::new();
        for identifier in self.chain_dependencies() {
            match resolver.find_object(identifier) {
                Some(object) => collected.extend(object.criteria()),
                None => log_warning!(
                    "Chain dependency not found",
                    "code" => codes::scan::UNRESOLVED_CHAIN,
                    "reference" => identifier
                ),
            }
        }
        collected
    }

    /// Soft conditions swallowed by the last preparation
    fn diagnostics(&self) -> ScanDiagnostics {
        ScanDiagnostics::default()
    }
}

fn require_field(kind: SourceKind, field: &'static str, value: &str) -> Result<(), SourceError> {
    if value.is_empty() {
        return Err(SourceError::MissingField { kind, field });
    }
    Ok(())
}

fn compile_field(kind: SourceKind, field: &'static str, pattern: &str) -> Result<Regex, SourceError> {
    Regex::new(pattern).map_err(|source| SourceError::InvalidPattern {
        kind,
        field,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(SourceKind::Package.to_string(), "package");
        assert_eq!(SourceKind::FileContent.to_string(), "filecontent");
        assert_eq!(SourceKind::FileName.to_string(), "filename");
        assert_eq!(SourceKind::Raw.to_string(), "raw");
        assert_eq!(
            serde_json::to_string(&SourceKind::FileContent).unwrap(),
            "\"filecontent\""
        );
    }

    #[test]
    fn test_require_field() {
        assert!(require_field(SourceKind::FileContent, "path", "/etc").is_ok());
        let err = require_field(SourceKind::FileContent, "path", "").unwrap_err();
        assert_eq!(err.to_string(), "filecontent path must be set");
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_compile_field() {
        assert!(compile_field(SourceKind::FileName, "file", r"^\w+$").is_ok());
        let err = compile_field(SourceKind::FileName, "file", "(").unwrap_err();
        assert!(err.to_string().starts_with("filename file is not a valid expression"));
    }
}
