//! Package source
//!
//! Reports installed versions of a named package, optionally narrowed by a
//! version pattern.

use super::{compile_field, require_field, GenericSource, PrepareContext, SourceError, SourceKind};
use crate::log_debug;
use crate::types::{expand_variables, EvaluationCriteria, Variable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageSource {
    pub name: String,
    /// Only versions matching this expression are kept
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collect_match: Option<String>,

    #[serde(skip)]
    versions: Vec<String>,
    #[serde(skip)]
    chained: Vec<EvaluationCriteria>,
}

impl PackageSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_collect_match(mut self, pattern: impl Into<String>) -> Self {
        self.collect_match = Some(pattern.into());
        self
    }

    pub fn is_populated(&self) -> bool {
        !self.name.is_empty()
    }

    pub fn versions(&self) -> &[String] {
        &self.versions
    }
}

impl GenericSource for PackageSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Package
    }

    fn validate(&self) -> Result<(), SourceError> {
        require_field(self.kind(), "name", &self.name)?;
        if let Some(pattern) = &self.collect_match {
            compile_field(self.kind(), "collect_match", pattern)?;
        }
        Ok(())
    }

    fn prepare(&mut self, context: &PrepareContext<'_>) -> Result<(), SourceError> {
        let filter = match &self.collect_match {
            Some(pattern) => Some(compile_field(self.kind(), "collect_match", pattern)?),
            None => None,
        };

        let installed = context.inventory.installed_versions(&self.name)?;
        log_debug!(
            "Package versions",
            "package" => &self.name,
            "inventory" => context.inventory.inventory_id(),
            "installed" => installed.len()
        );

        self.versions = installed
            .into_iter()
            .filter(|version| filter.as_ref().map_or(true, |re| re.is_match(version)))
            .collect();
        Ok(())
    }

    fn expand_variables(&mut self, variables: &[Variable]) {
        self.name = expand_variables(variables, &self.name);
    }

    fn criteria(&self) -> Vec<EvaluationCriteria> {
        self.versions
            .iter()
            .map(|version| EvaluationCriteria::new(self.name.clone(), version.clone()))
            .chain(self.chained.iter().cloned())
            .collect()
    }

    fn merge_criteria(&mut self, extra: Vec<EvaluationCriteria>) {
        self.chained.extend(extra);
    }
}
