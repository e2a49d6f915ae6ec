//! # Scribe Base - Host Evidence Collection Core
//!
//! Declarative test objects resolved into source checks (package, file
//! content, file name, raw) whose results are emitted as
//! [`EvaluationCriteria`] for a downstream rule evaluator.

pub mod config;
pub mod document;
pub mod inventory;
pub mod locator;
pub mod logging;
pub mod matcher;
pub mod object;
pub mod report;
pub mod sources;
pub mod types;

#[doc(hidden)]
pub use log;

// Convenience re-exports
pub use config::{ConfigError, ScribeConfig, TraversalMode};
pub use document::{Document, DocumentError, PreparationSummary};
pub use object::{ObjectError, SourceCheck, TestObject};
pub use types::{EvaluationCriteria, ScanDiagnostics, Variable};

pub mod prelude {
    pub use crate::config::{ConfigError, ScribeConfig, TraversalMode};
    pub use crate::document::{Document, DocumentError, ObjectFailure, PreparationSummary};
    pub use crate::inventory::{
        CommandExecutor, CommandPackageInventory, InventoryError, PackageInventory,
        StaticPackageInventory,
    };
    pub use crate::locator::{FileLocator, LocatorError};
    pub use crate::matcher::{file_content_check, ContentMatch, ContentMatcher, MatchLine};
    pub use crate::object::{ObjectError, SourceCheck, TestObject};
    pub use crate::report::{EvidenceReport, HostContext};
    pub use crate::sources::{
        FileContentSource, FileNameSource, GenericSource, ObjectResolver, PackageSource,
        PrepareContext, RawIdentifier, RawSource, SourceError, SourceKind,
    };
    pub use crate::types::{EvaluationCriteria, ScanDiagnostics, SkipReason, Variable};
}
