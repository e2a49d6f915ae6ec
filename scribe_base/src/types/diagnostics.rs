//! Record of soft conditions swallowed while scanning
//!
//! Best-effort scans never fail on an unreadable directory or file; the
//! condition is recorded here instead so callers can still inspect it.

use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Classification of an I/O failure on a single path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Access was refused; will not change without a permission change
    PermissionDenied,
    /// Path disappeared between listing and reading
    Vanished,
    /// Any other I/O failure, possibly transient
    Io,
}

impl SkipReason {
    pub fn from_io_kind(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::PermissionDenied => SkipReason::PermissionDenied,
            io::ErrorKind::NotFound => SkipReason::Vanished,
            _ => SkipReason::Io,
        }
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, SkipReason::PermissionDenied)
    }
}

/// A path skipped during a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPath {
    pub path: PathBuf,
    pub reason: SkipReason,
    pub message: String,
}

impl SkippedPath {
    pub fn new(path: impl Into<PathBuf>, reason: SkipReason, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanDiagnostics {
    pub unreadable_directories: Vec<SkippedPath>,
    pub truncated_directories: Vec<PathBuf>,
    pub unreadable_files: Vec<SkippedPath>,
}

impl ScanDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if nothing was skipped
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.unreadable_directories.len()
            + self.truncated_directories.len()
            + self.unreadable_files.len()
    }

    pub fn merge(&mut self, other: ScanDiagnostics) {
        self.unreadable_directories
            .extend(other.unreadable_directories);
        self.truncated_directories.extend(other.truncated_directories);
        self.unreadable_files.extend(other.unreadable_files);
    }
}
