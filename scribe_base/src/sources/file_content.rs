//! File content source
//!
//! Locates files below `path` whose name matches `file` and records every
//! capture group of every line matching `expression` as evidence.

use super::{compile_field, require_field, GenericSource, PrepareContext, SourceError, SourceKind};
use crate::locator::FileLocator;
use crate::logging::codes;
use crate::matcher::{ContentMatch, ContentMatcher};
use crate::types::{expand_variables, EvaluationCriteria, ScanDiagnostics, SkipReason, SkippedPath, Variable};
use crate::{log_debug, log_warning};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileContentSource {
    /// Search root
    pub path: String,
    /// File name pattern
    pub file: String,
    /// Content expression; not subject to variable expansion
    pub expression: String,

    #[serde(skip)]
    matches: Vec<ContentMatch>,
    #[serde(skip)]
    chained: Vec<EvaluationCriteria>,
    #[serde(skip)]
    diagnostics: ScanDiagnostics,
}

impl FileContentSource {
    pub fn new(
        path: impl Into<String>,
        file: impl Into<String>,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            file: file.into(),
            expression: expression.into(),
            ..Self::default()
        }
    }

    pub fn is_populated(&self) -> bool {
        !self.path.is_empty()
    }

    /// Files with at least one matching line, in discovery order
    pub fn matches(&self) -> &[ContentMatch] {
        &self.matches
    }
}

impl GenericSource for FileContentSource {
    fn kind(&self) -> SourceKind {
        SourceKind::FileContent
    }

    fn validate(&self) -> Result<(), SourceError> {
        require_field(self.kind(), "path", &self.path)?;
        require_field(self.kind(), "file", &self.file)?;
        compile_field(self.kind(), "file", &self.file)?;
        require_field(self.kind(), "expression", &self.expression)?;
        compile_field(self.kind(), "expression", &self.expression)?;
        Ok(())
    }

    fn prepare(&mut self, context: &PrepareContext<'_>) -> Result<(), SourceError> {
        log_debug!(
            "Analyzing file system",
            "path" => &self.path,
            "file" => &self.file
        );

        let matcher = ContentMatcher::new(&self.expression)?;
        let mut locator = FileLocator::from_config(&self.path, context.config);
        locator.locate(&self.file, true)?;
        let (candidates, mut diagnostics) = locator.into_parts();

        let best_effort = context.config.traversal_mode.is_best_effort();
        let mut matches = Vec::new();

        for candidate in candidates {
            let lines = match matcher.scan_file(&candidate) {
                Ok(lines) => lines,
                Err(err) if best_effort && err.is_file_error() => {
                    log_warning!(
                        "Skipping unreadable file",
                        "code" => codes::scan::UNREADABLE_FILE,
                        "path" => candidate.display(),
                        "error" => &err
                    );
                    let reason = err
                        .io_kind()
                        .map(SkipReason::from_io_kind)
                        .unwrap_or(SkipReason::Io);
                    diagnostics
                        .unreadable_files
                        .push(SkippedPath::new(candidate, reason, err.to_string()));
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if lines.is_empty() {
                continue;
            }

            log_debug!(
                "Content matches",
                "path" => candidate.display(),
                "lines" => lines.len()
            );
            for line in &lines {
                log_debug!(
                    "Full match",
                    "text" => &line.full_match,
                    "groups" => line.groups.join(", ")
                );
            }

            matches.push(ContentMatch {
                path: candidate,
                lines,
            });
        }

        self.matches = matches;
        self.diagnostics = diagnostics;
        Ok(())
    }

    fn expand_variables(&mut self, variables: &[Variable]) {
        self.path = expand_variables(variables, &self.path);
        self.file = expand_variables(variables, &self.file);
    }

    fn criteria(&self) -> Vec<EvaluationCriteria> {
        let mut criteria = Vec::new();
        for content in &self.matches {
            let identifier = content.path.to_string_lossy().into_owned();
            for line in &content.lines {
                for group in &line.groups {
                    criteria.push(EvaluationCriteria::new(identifier.clone(), group.clone()));
                }
            }
        }
        criteria.extend(self.chained.iter().cloned());
        criteria
    }

    fn merge_criteria(&mut self, extra: Vec<EvaluationCriteria>) {
        self.chained.extend(extra);
    }

    fn diagnostics(&self) -> ScanDiagnostics {
        self.diagnostics.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScribeConfig;
    use crate::inventory::StaticPackageInventory;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::TempDir;

    fn prepare(source: &mut FileContentSource, config: &ScribeConfig) -> Result<(), SourceError> {
        let inventory = StaticPackageInventory::new();
        let context = PrepareContext::new(config, &inventory, &[]);
        source.prepare(&context)
    }

    #[test]
    fn test_validate_missing_fields() {
        let cases = [
            (FileContentSource::new("", "f", "e"), "filecontent path must be set"),
            (FileContentSource::new("/p", "", "e"), "filecontent file must be set"),
            (
                FileContentSource::new("/p", "f", ""),
                "filecontent expression must be set",
            ),
        ];
        for (source, message) in cases {
            assert_eq!(source.validate().unwrap_err().to_string(), message);
        }
    }

    #[test]
    fn test_validate_invalid_patterns() {
        assert_matches!(
            FileContentSource::new("/p", "(", "e").validate(),
            Err(SourceError::InvalidPattern { field: "file", .. })
        );
        assert_matches!(
            FileContentSource::new("/p", "f", "[").validate(),
            Err(SourceError::InvalidPattern { field: "expression", .. })
        );
        assert!(FileContentSource::new("/p", "f", "e").validate().is_ok());
    }

    #[test]
    fn test_two_matching_lines_one_group() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("sshd_config");
        fs::write(
            &config_path,
            "Port 22\nCiphers aes256-ctr\n# Ciphers none\nCiphers chacha20\n",
        )
        .unwrap();

        let mut source = FileContentSource::new(
            tmp.path().to_string_lossy(),
            "^sshd_config$",
            r"^Ciphers (\S+)",
        );
        prepare(&mut source, &ScribeConfig::default()).unwrap();

        let identifier = config_path.to_string_lossy().to_string();
        assert_eq!(
            source.criteria(),
            vec![
                EvaluationCriteria::new(identifier.clone(), "aes256-ctr"),
                EvaluationCriteria::new(identifier, "chacha20"),
            ]
        );
        assert_eq!(source.matches().len(), 1);
    }

    #[test]
    fn test_cross_product_of_groups() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("limits.conf"), "a 1\nb 2\n").unwrap();

        let mut source =
            FileContentSource::new(tmp.path().to_string_lossy(), r"\.conf$", r"^(\w) (\d)$");
        prepare(&mut source, &ScribeConfig::default()).unwrap();

        let values: Vec<String> = source.criteria().into_iter().map(|c| c.test_value).collect();
        assert_eq!(values, vec!["a", "1", "b", "2"]);
    }

    #[test]
    fn test_file_without_matching_lines_contributes_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.conf"), "nothing\n").unwrap();

        let mut source =
            FileContentSource::new(tmp.path().to_string_lossy(), "app", r"^key=(\w+)");
        prepare(&mut source, &ScribeConfig::default()).unwrap();

        assert!(source.matches().is_empty());
        assert!(source.criteria().is_empty());
    }

    #[test]
    fn test_expression_without_groups_yields_no_criteria() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("app.conf"), "enabled\n").unwrap();

        let mut source = FileContentSource::new(tmp.path().to_string_lossy(), "app", "enabled");
        prepare(&mut source, &ScribeConfig::default()).unwrap();

        assert_eq!(source.matches().len(), 1);
        assert!(source.criteria().is_empty());
    }

    #[test]
    fn test_expand_variables_skips_expression() {
        let vars = vec![Variable::new("root", "/srv"), Variable::new("name", "app")];
        let mut source = FileContentSource::new("${root}/etc", "${name}.conf", "${name}=(.*)");
        source.expand_variables(&vars);

        assert_eq!(source.path, "/srv/etc");
        assert_eq!(source.file, "app.conf");
        assert_eq!(source.expression, "${name}=(.*)");
    }

    #[test]
    fn test_merge_criteria_appended() {
        let mut source = FileContentSource::new("/p", "f", "e");
        source.merge_criteria(vec![EvaluationCriteria::new("extra", "1")]);
        assert_eq!(source.criteria(), vec![EvaluationCriteria::new("extra", "1")]);
        assert!(!source.is_chain());
        assert!(source.chain_dependencies().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_file_skipped_best_effort() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let locked = tmp.path().join("a.conf");
        fs::write(&locked, "key=secret\n").unwrap();
        fs::write(tmp.path().join("b.conf"), "key=open\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let enforced = fs::File::open(&locked).is_err();

        let mut source =
            FileContentSource::new(tmp.path().to_string_lossy(), r"\.conf$", r"^key=(\w+)");
        let result = prepare(&mut source, &ScribeConfig::default());
        let strict_result = prepare(
            &mut FileContentSource::new(tmp.path().to_string_lossy(), r"\.conf$", r"^key=(\w+)"),
            &ScribeConfig::default().strict(),
        );
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

        assert!(result.is_ok());
        let values: Vec<String> = source.criteria().into_iter().map(|c| c.test_value).collect();
        assert!(values.contains(&"open".to_string()));
        if enforced {
            assert_eq!(values, vec!["open"]);
            assert_eq!(source.diagnostics().unreadable_files.len(), 1);
            assert_eq!(
                source.diagnostics().unreadable_files[0].reason,
                SkipReason::PermissionDenied
            );
            assert_matches!(strict_result, Err(SourceError::Matcher(_)));
        }
    }

    #[test]
    fn test_depth_from_config() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("nested")).unwrap();
        fs::write(tmp.path().join("nested/app.conf"), "key=deep\n").unwrap();

        let mut source =
            FileContentSource::new(tmp.path().to_string_lossy(), "app", r"^key=(\w+)");
        prepare(&mut source, &ScribeConfig::default().with_max_depth(1)).unwrap();

        assert!(source.criteria().is_empty());
        assert_eq!(source.diagnostics().truncated_directories.len(), 1);
    }

    #[test]
    fn test_deserialize_ignores_state() {
        let source: FileContentSource =
            serde_json::from_str(r#"{"path":"/etc","file":"^passwd$","expression":"^(\\w+):"}"#)
                .unwrap();
        assert!(source.is_populated());
        assert_eq!(source.file, "^passwd$");
        assert!(source.matches().is_empty());
    }
}
