use serde::{Deserialize, Serialize};

/// Document variable substituted into source configuration as `${key}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    pub value: String,
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Placeholder text this variable replaces
    pub fn placeholder(&self) -> String {
        format!("${{{}}}", self.key)
    }
}

/// Replace every `${key}` placeholder in `input`
///
/// Variables are applied in declaration order, so a value may itself contain a
/// placeholder for a variable declared later.
pub fn expand_variables(variables: &[Variable], input: &str) -> String {
    let mut expanded = input.to_string();
    for variable in variables {
        let placeholder = variable.placeholder();
        if expanded.contains(&placeholder) {
            expanded = expanded.replace(&placeholder, &variable.value);
        }
    }
    expanded
}
