use serde::{Deserialize, Serialize};

/// Evidence record consumed by the rule evaluator
///
/// For file based sources the identifier is the path the value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationCriteria {
    pub identifier: String,
    pub test_value: String,
}

impl EvaluationCriteria {
    pub fn new(identifier: impl Into<String>, test_value: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            test_value: test_value.into(),
        }
    }
}

impl std::fmt::Display for EvaluationCriteria {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = \"{}\"", self.identifier, self.test_value)
    }
}
