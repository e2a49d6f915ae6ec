//! Raw source: literal evidence declared in the document

use super::{GenericSource, PrepareContext, SourceError, SourceKind};
use crate::types::{expand_variables, EvaluationCriteria, Variable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawIdentifier {
    pub identifier: String,
    pub value: String,
}

impl RawIdentifier {
    pub fn new(identifier: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSource {
    pub identifiers: Vec<RawIdentifier>,
    /// Only imported by other objects
    pub chain: bool,

    #[serde(skip)]
    chained: Vec<EvaluationCriteria>,
}

impl RawSource {
    pub fn new(identifiers: Vec<RawIdentifier>) -> Self {
        Self {
            identifiers,
            ..Self::default()
        }
    }

    pub fn as_chain(mut self) -> Self {
        self.chain = true;
        self
    }

    pub fn is_populated(&self) -> bool {
        !self.identifiers.is_empty()
    }
}

impl GenericSource for RawSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Raw
    }

    fn validate(&self) -> Result<(), SourceError> {
        if self.identifiers.is_empty() {
            return Err(SourceError::MissingField {
                kind: self.kind(),
                field: "identifiers",
            });
        }
        if let Some(index) = self
            .identifiers
            .iter()
            .position(|entry| entry.identifier.is_empty())
        {
            return Err(SourceError::EmptyEntry {
                kind: self.kind(),
                field: "identifiers",
                index,
            });
        }
        Ok(())
    }

    fn prepare(&mut self, _context: &PrepareContext<'_>) -> Result<(), SourceError> {
        Ok(())
    }

    fn is_chain(&self) -> bool {
        self.chain
    }

    fn expand_variables(&mut self, variables: &[Variable]) {
        for entry in &mut self.identifiers {
            entry.value = expand_variables(variables, &entry.value);
        }
    }

    fn criteria(&self) -> Vec<EvaluationCriteria> {
        self.identifiers
            .iter()
            .map(|entry| EvaluationCriteria::new(entry.identifier.clone(), entry.value.clone()))
            .chain(self.chained.iter().cloned())
            .collect()
    }

    fn merge_criteria(&mut self, extra: Vec<EvaluationCriteria>) {
        self.chained.extend(extra);
    }
}
