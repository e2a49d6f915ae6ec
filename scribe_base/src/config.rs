//! # Scribe Configuration
//!
//! Runtime knobs for traversal, preparation threads and command execution.
//! Every field has a default, so an empty TOML file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default maximum directory depth searched by the file locator
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default timeout for package inventory commands
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 5;

/// Upper bound for the default number of preparation threads
const DEFAULT_THREAD_CAP: usize = 8;

/// CPUs usable by this process, 4 when the platform cannot tell
pub fn available_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// How traversal and per-file matching react to I/O failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalMode {
    /// Skip unreadable directories and files, record them in diagnostics
    #[default]
    BestEffort,
    /// Fail the owning object on the first unreadable directory or file
    Strict,
}

impl TraversalMode {
    pub fn is_best_effort(&self) -> bool {
        matches!(self, TraversalMode::BestEffort)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid configuration syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration for object preparation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScribeConfig {
    /// Maximum directory depth searched below a source root (root is depth 1)
    pub max_depth: usize,

    /// Failure policy for traversal and content matching
    pub traversal_mode: TraversalMode,

    /// Worker threads used to prepare document objects (1 = serial)
    pub max_threads: usize,

    /// Timeout applied to each package inventory command
    pub command_timeout_secs: u64,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            traversal_mode: TraversalMode::BestEffort,
            max_threads: available_cpus().min(DEFAULT_THREAD_CAP),
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

impl ScribeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ScribeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_threads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_threads".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "command_timeout_secs".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Set maximum search depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set traversal failure policy
    pub fn with_traversal_mode(mut self, mode: TraversalMode) -> Self {
        self.traversal_mode = mode;
        self
    }

    /// Fail on the first unreadable directory or file
    pub fn strict(self) -> Self {
        self.with_traversal_mode(TraversalMode::Strict)
    }

    /// Set maximum threads for document preparation
    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    /// Set package command timeout in seconds
    pub fn with_command_timeout_secs(mut self, secs: u64) -> Self {
        self.command_timeout_secs = secs;
        self
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
