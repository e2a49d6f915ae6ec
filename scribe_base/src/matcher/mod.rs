//! # Content Matcher
//!
//! Line oriented regular expression scan of a single file. Every matching line
//! produces a [`MatchLine`] holding the full match and its capture groups.

pub mod error;

pub use error::MatcherError;

use regex::Regex;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One matching line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchLine {
    pub full_match: String,
    /// Capture groups in order; a group that did not participate is empty
    pub groups: Vec<String>,
}

/// All matching lines of one file, in file order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentMatch {
    pub path: PathBuf,
    pub lines: Vec<MatchLine>,
}

/// Compiled content expression, reusable across files
#[derive(Debug, Clone)]
pub struct ContentMatcher {
    expression: Regex,
}

impl ContentMatcher {
    pub fn new(expression: &str) -> Result<Self, MatcherError> {
        let expression = Regex::new(expression).map_err(|source| {
            MatcherError::InvalidExpression {
                expression: expression.to_string(),
                source,
            }
        })?;
        Ok(Self { expression })
    }

    pub fn expression(&self) -> &str {
        self.expression.as_str()
    }

    /// Apply the expression to a single line
    pub fn match_line(&self, line: &str) -> Option<MatchLine> {
        self.expression.captures(line).map(|caps| MatchLine {
            full_match: caps[0].to_string(),
            groups: caps
                .iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        })
    }

    /// Scan a reader to end of input
    ///
    /// `path` only labels read errors.
    pub fn scan_reader<R: BufRead>(
        &self,
        mut reader: R,
        path: &Path,
    ) -> Result<Vec<MatchLine>, MatcherError> {
        let mut matches = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| MatcherError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
            if read == 0 {
                break;
            }

            let line = String::from_utf8_lossy(trim_line_ending(&buf));
            if let Some(found) = self.match_line(&line) {
                matches.push(found);
            }
        }

        Ok(matches)
    }

    /// Open and scan one file
    pub fn scan_file(&self, path: &Path) -> Result<Vec<MatchLine>, MatcherError> {
        let file = File::open(path).map_err(|source| MatcherError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.scan_reader(BufReader::new(file), path)
    }
}

/// Compile `expression` and scan the file at `path`
///
/// An empty result means the file was read and nothing matched.
pub fn file_content_check(
    path: impl AsRef<Path>,
    expression: &str,
) -> Result<Vec<MatchLine>, MatcherError> {
    ContentMatcher::new(expression)?.scan_file(path.as_ref())
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn scan(expression: &str, input: &[u8]) -> Vec<MatchLine> {
        ContentMatcher::new(expression)
            .unwrap()
            .scan_reader(Cursor::new(input.to_vec()), Path::new("mem"))
            .unwrap()
    }

    #[test]
    fn test_groups_in_line_order() {
        let found = scan(
            r"^PermitRootLogin (\S+)",
            b"# comment\nPermitRootLogin no\nPort 22\nPermitRootLogin yes\n",
        );
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].full_match, "PermitRootLogin no");
        assert_eq!(found[0].groups, vec!["no"]);
        assert_eq!(found[1].groups, vec!["yes"]);
    }

    #[test]
    fn test_no_groups() {
        let found = scan("Port", b"Port 22\n");
        assert_eq!(found.len(), 1);
        assert!(found[0].groups.is_empty());
    }

    #[test]
    fn test_non_participating_group_is_empty() {
        let found = scan(r"^(a)?(b)", b"b\n");
        assert_eq!(found[0].groups, vec!["".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_final_line_without_newline() {
        let found = scan(r"^key=(\w+)$", b"key=first\nkey=last");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].groups, vec!["last"]);
    }

    #[test]
    fn test_line_endings_stripped() {
        let found = scan(r"^value=(.*)$", b"value=crlf\r\n");
        assert_eq!(found[0].groups, vec!["crlf"]);
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let found = scan(r"^name=(\w+)", b"name=ok\xff\n");
        assert_eq!(found[0].groups, vec!["ok"]);
    }

    #[test]
    fn test_no_matches_is_empty_ok() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plain.txt");
        std::fs::write(&path, "nothing here\n").unwrap();

        let found = file_content_check(&path, "absent").unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_open_error() {
        let tmp = TempDir::new().unwrap();
        let err = file_content_check(tmp.path().join("missing"), "x").unwrap_err();
        assert_matches!(err, MatcherError::Open { .. });
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
        assert!(err.is_file_error());
    }

    #[test]
    fn test_invalid_expression_checked_before_open() {
        let tmp = TempDir::new().unwrap();
        let err = file_content_check(tmp.path().join("missing"), "([").unwrap_err();
        assert_matches!(err, MatcherError::InvalidExpression { .. });
        assert!(!err.is_file_error());
    }

    #[test]
    fn test_reusable_across_files() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        std::fs::write(&first, "v=1\n").unwrap();
        std::fs::write(&second, "v=2\nv=3\n").unwrap();

        let matcher = ContentMatcher::new(r"v=(\d)").unwrap();
        assert_eq!(matcher.expression(), r"v=(\d)");
        assert_eq!(matcher.scan_file(&first).unwrap().len(), 1);
        assert_eq!(matcher.scan_file(&second).unwrap().len(), 2);
    }
}
