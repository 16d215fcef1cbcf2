//! The untyped request as handed over by the transport layer

use indexmap::IndexMap;
use serde::Deserialize;

/// A dimension path segment with its matrix parameters
///
/// `/dimensions/region;show=id,desc` arrives as path `region` with matrix
/// parameter `show = ["id,desc"]`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct PathSegment {
    pub path: String,
    #[serde(default)]
    pub matrix: IndexMap<String, Vec<String>>,
}

impl PathSegment {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), matrix: IndexMap::new() }
    }

    /// Add a matrix parameter value
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.matrix.entry(key.into()).or_default().push(value.into());
        self
    }

    /// All values of a matrix parameter
    pub fn param(&self, key: &str) -> &[String] {
        self.matrix.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// The untyped data request as extracted by the transport layer
///
/// Every field is the raw string the caller sent. Absent and empty
/// strings mean the same thing.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub grain: String,
    #[serde(default)]
    pub dimensions: Vec<PathSegment>,
    pub metrics: Option<String>,
    pub intervals: Option<String>,
    pub filters: Option<String>,
    pub having: Option<String>,
    pub sorts: Option<String>,
    pub count: Option<String>,
    pub top_n: Option<String>,
    pub format: Option<String>,
    pub time_zone: Option<String>,
    pub async_after: Option<String>,
    pub per_page: Option<String>,
    pub page: Option<String>,
}
