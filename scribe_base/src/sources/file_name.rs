//! File name source
//!
//! Records the presence of files below `path` whose name matches `file`.
//! Capture groups of the name pattern become the evidence values; without
//! groups the file name itself is recorded.

use super::{compile_field, require_field, GenericSource, PrepareContext, SourceError, SourceKind};
use crate::locator::FileLocator;
use crate::log_debug;
use crate::types::{expand_variables, EvaluationCriteria, ScanDiagnostics, Variable};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNameSource {
    pub path: String,
    pub file: String,
    /// Objects whose evidence is merged into this one
    pub import_chain: Vec<String>,

    #[serde(skip)]
    found: Vec<EvaluationCriteria>,
    #[serde(skip)]
    chained: Vec<EvaluationCriteria>,
    #[serde(skip)]
    diagnostics: ScanDiagnostics,
}

impl FileNameSource {
    pub fn new(path: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file: file.into(),
            ..Self::default()
        }
    }

    pub fn with_import(mut self, identifier: impl Into<String>) -> Self {
        self.import_chain.push(identifier.into());
        self
    }

    pub fn is_populated(&self) -> bool {
        !self.path.is_empty()
    }
}

fn name_evidence(pattern: &Regex, located: &[PathBuf]) -> Vec<EvaluationCriteria> {
    let mut evidence = Vec::new();
    for path in located {
        let identifier = path.to_string_lossy().into_owned();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if pattern.captures_len() <= 1 {
            evidence.push(EvaluationCriteria::new(identifier, name));
            continue;
        }

        if let Some(caps) = pattern.captures(&name) {
            for group in caps.iter().skip(1) {
                let value = group.map(|m| m.as_str()).unwrap_or_default();
                evidence.push(EvaluationCriteria::new(identifier.clone(), value));
            }
        }
    }
    evidence
}

impl GenericSource for FileNameSource {
    fn kind(&self) -> SourceKind {
        SourceKind::FileName
    }

    fn validate(&self) -> Result<(), SourceError> {
        require_field(self.kind(), "path", &self.path)?;
        require_field(self.kind(), "file", &self.file)?;
        compile_field(self.kind(), "file", &self.file)?;
        if let Some(index) = self.import_chain.iter().position(|id| id.is_empty()) {
            return Err(SourceError::EmptyEntry {
                kind: self.kind(),
                field: "import_chain",
                index,
            });
        }
        Ok(())
    }

    fn prepare(&mut self, context: &PrepareContext<'_>) -> Result<(), SourceError> {
        let pattern = compile_field(self.kind(), "file", &self.file)?;
        let mut locator = FileLocator::from_config(&self.path, context.config);
        locator.locate(&self.file, true)?;
        let (located, diagnostics) = locator.into_parts();

        log_debug!(
            "File names located",
            "path" => &self.path,
            "file" => &self.file,
            "found" => located.len()
        );

        self.found = name_evidence(&pattern, &located);
        self.diagnostics = diagnostics;
        Ok(())
    }

    fn expand_variables(&mut self, variables: &[Variable]) {
        self.path = expand_variables(variables, &self.path);
        self.file = expand_variables(variables, &self.file);
    }

    fn criteria(&self) -> Vec<EvaluationCriteria> {
        self.found.iter().chain(&self.chained).cloned().collect()
    }

    fn merge_criteria(&mut self, extra: Vec<EvaluationCriteria>) {
        self.chained.extend(extra);
    }

    fn chain_dependencies(&self) -> &[String] {
        &self.import_chain
    }

    fn diagnostics(&self) -> ScanDiagnostics {
        self.diagnostics.clone()
    }
}
