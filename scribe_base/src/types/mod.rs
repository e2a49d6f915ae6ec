//! Shared data types for sources, objects and reports

pub mod criteria;
pub mod diagnostics;
pub mod variable;

pub use criteria::EvaluationCriteria;
pub use diagnostics::{ScanDiagnostics, SkipReason, SkippedPath};
pub use variable::{expand_variables, Variable};
