//! Identifiers for simulation entities

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a stochastic variable within a run configuration
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableId(pub String);

impl VariableId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariableId {
    fn from(id: &str) -> Self {
        VariableId(id.to_string())
    }
}

impl From<String> for VariableId {
    fn from(id: String) -> Self {
        VariableId(id)
    }
}
