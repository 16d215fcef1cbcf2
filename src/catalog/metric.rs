//! Metric catalog entries

use std::hash::{Hash, Hasher};
use serde::Deserialize;

/// A named numeric measure that requests can ask for
#[derive(Debug, Deserialize)]
pub struct Metric {
    pub name: String,
    pub label: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
}

impl Metric {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), label: None, description: None }
    }
}

impl PartialEq for Metric {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Metric {}

impl Hash for Metric {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
