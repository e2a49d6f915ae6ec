//! Diagnostic codes for lifecycle failures and swallowed scan conditions
//!
//! Codes are attached to log records so that soft conditions which never reach
//! an object's cached error can still be tracked downstream.

/// Code wrapper shared by error and warning events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Soft conditions encountered while scanning the filesystem
pub mod scan {
    use super::Code;

    pub const UNREADABLE_DIRECTORY: Code = Code::new("W101");
    pub const DEPTH_TRUNCATED: Code = Code::new("W102");
    pub const UNREADABLE_FILE: Code = Code::new("W103");
    pub const UNRESOLVED_CHAIN: Code = Code::new("W104");
}

/// Object lifecycle failures
pub mod lifecycle {
    use super::Code;

    pub const VALIDATION_FAILED: Code = Code::new("E201");
    pub const PREPARATION_FAILED: Code = Code::new("E202");
    pub const DOCUMENT_LOAD_FAILED: Code = Code::new("E203");
    pub const WORKER_PANICKED: Code = Code::new("E204");
}

/// Human readable description for a code
pub fn get_description(code: &str) -> &'static str {
    match code {
        "W101" => "Directory could not be read during traversal",
        "W102" => "Directory skipped because it exceeds the maximum search depth",
        "W103" => "Located file could not be read for content matching",
        "W104" => "Chain dependency did not resolve to an object",
        "E201" => "Object configuration failed validation",
        "E202" => "Object preparation failed",
        "E203" => "Document could not be loaded",
        "E204" => "Preparation worker thread panicked",
        _ => "Unknown code",
    }
}
