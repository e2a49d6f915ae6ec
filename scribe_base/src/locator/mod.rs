//! # Filesystem Locator
//!
//! Depth-bounded recursive search for files by literal name or regular
//! expression. Traversal is depth-first pre-order in directory listing order;
//! symbolic links are neither followed nor reported.
//!
//! A locator instance runs exactly one traversal. Directories deeper than the
//! configured maximum are skipped silently and unreadable directories are
//! either skipped (best-effort) or fatal (strict). Both conditions are
//! recorded in the locator's [`ScanDiagnostics`].

pub mod error;

pub use error::LocatorError;

use crate::config::{ScribeConfig, TraversalMode, DEFAULT_MAX_DEPTH};
use crate::logging::codes;
use crate::types::{ScanDiagnostics, SkipReason, SkippedPath};
use crate::{log_debug, log_warning};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File name test applied to each regular file
enum NameMatcher {
    Literal(String),
    Pattern(Regex),
}

impl NameMatcher {
    fn new(target: &str, use_regexp: bool) -> Result<Self, LocatorError> {
        if !use_regexp {
            return Ok(NameMatcher::Literal(target.to_string()));
        }
        let re = Regex::new(target).map_err(|source| LocatorError::InvalidPattern {
            pattern: target.to_string(),
            source,
        })?;
        Ok(NameMatcher::Pattern(re))
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Literal(target) => name == target,
            NameMatcher::Pattern(re) => re.is_match(name),
        }
    }
}

/// Single-use depth-bounded file finder
#[derive(Debug)]
pub struct FileLocator {
    root: PathBuf,
    max_depth: usize,
    mode: TraversalMode,
    executed: bool,
    matches: Vec<PathBuf>,
    diagnostics: ScanDiagnostics,
}

impl FileLocator {
    /// Create a best-effort locator with the default depth of 10
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            mode: TraversalMode::BestEffort,
            executed: false,
            matches: Vec::new(),
            diagnostics: ScanDiagnostics::new(),
        }
    }

    /// Create a locator using depth and traversal mode from configuration
    pub fn from_config(root: impl Into<PathBuf>, config: &ScribeConfig) -> Self {
        Self::new(root)
            .with_max_depth(config.max_depth)
            .with_mode(config.traversal_mode)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_mode(mut self, mode: TraversalMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_executed(&self) -> bool {
        self.executed
    }

    /// Paths found by the traversal, in discovery order
    pub fn matches(&self) -> &[PathBuf] {
        &self.matches
    }

    pub fn diagnostics(&self) -> &ScanDiagnostics {
        &self.diagnostics
    }

    /// Consume the locator, returning matches and diagnostics
    pub fn into_parts(self) -> (Vec<PathBuf>, ScanDiagnostics) {
        (self.matches, self.diagnostics)
    }

    /// Search below the root for regular files named `target`
    ///
    /// With `use_regexp` the target is an unanchored regular expression tested
    /// against each file name; otherwise names must be equal.
    ///
    /// # Errors
    /// Fails if the locator already ran, if the pattern does not compile, or
    /// (strict mode only) if a directory cannot be read.
    pub fn locate(&mut self, target: &str, use_regexp: bool) -> Result<(), LocatorError> {
        if self.executed {
            return Err(LocatorError::AlreadyExecuted);
        }
        self.executed = true;

        let matcher = NameMatcher::new(target, use_regexp)?;

        // The root itself is depth 1, so a zero depth never reads anything
        if self.max_depth == 0 {
            return Ok(());
        }

        log_debug!(
            "Locating files",
            "root" => self.root.display(),
            "target" => target,
            "max_depth" => self.max_depth
        );

        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .max_depth(self.max_depth);

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.record_unreadable(err)?;
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let file_type = entry.file_type();
            if file_type.is_dir() {
                if entry.depth() == self.max_depth {
                    log_debug!(
                        "Directory exceeds search depth, skipping",
                        "code" => codes::scan::DEPTH_TRUNCATED,
                        "path" => entry.path().display()
                    );
                    self.diagnostics
                        .truncated_directories
                        .push(entry.into_path());
                }
                continue;
            }

            if file_type.is_file() && matcher.matches(&entry.file_name().to_string_lossy()) {
                self.matches.push(entry.into_path());
            }
        }

        log_debug!(
            "Locate finished",
            "root" => self.root.display(),
            "matches" => self.matches.len(),
            "skipped" => self.diagnostics.total()
        );

        Ok(())
    }

    fn record_unreadable(&mut self, err: walkdir::Error) -> Result<(), LocatorError> {
        let path = err
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        if !self.mode.is_best_effort() {
            return Err(LocatorError::DirectoryUnreadable { path, source: err });
        }

        let reason = err
            .io_error()
            .map(|io| SkipReason::from_io_kind(io.kind()))
            .unwrap_or(SkipReason::Io);

        log_warning!(
            "Skipping unreadable directory",
            "code" => codes::scan::UNREADABLE_DIRECTORY,
            "path" => path.display(),
            "error" => &err
        );

        self.diagnostics
            .unreadable_directories
            .push(SkippedPath::new(path, reason, err.to_string()));
        Ok(())
    }
}
