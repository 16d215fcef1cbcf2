//! Logical table definitions

use indexmap::IndexSet;
use serde::Deserialize;
use crate::request::{ApiFilters, FilterOperator};
use super::dimension::Dimension;

/// A queryable logical table
///
/// A table is served at one or more granularities and exposes a fixed set of
/// dimensions and metrics. It is looked up by (name, granularity).
#[derive(Debug, Deserialize)]
pub struct LogicalTable {
    pub name: String,
    /// Human-readable description
    pub description: Option<String>,
    /// Granularity keywords this table can be queried at (e.g. `day`, `all`)
    pub granularities: Vec<String>,
    /// Names of dimensions available on this table
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// Names of metrics available on this table
    #[serde(default)]
    pub metrics: Vec<String>,
}

impl LogicalTable {
    /// Check if the table can be queried at a granularity keyword
    pub fn has_granularity(&self, keyword: &str) -> bool {
        self.granularities.iter().any(|g| g.eq_ignore_ascii_case(keyword))
    }

    /// Check if a dimension is available on this table
    pub fn has_dimension(&self, name: &str) -> bool {
        self.dimensions.iter().any(|d| d == name)
    }

    /// Check if a metric is available on this table
    pub fn has_metric(&self, name: &str) -> bool {
        self.metrics.iter().any(|m| m == name)
    }

    /// Names of dimensions that make the request non-aggregatable
    ///
    /// A dimension that is not aggregatable must either be grouped on, or
    /// every filter on it must pin it to exactly one value with `eq`/`in`.
    /// Otherwise rows for different values would be summed together.
    pub fn aggregatability_violations<'a>(
        &self,
        dimensions: &IndexSet<&'a Dimension>,
        filters: &ApiFilters<'a>,
    ) -> Vec<String> {
        filters
            .iter()
            .filter(|(dimension, _)| !dimension.is_aggregatable())
            .filter(|(dimension, _)| !dimensions.contains(*dimension))
            .filter(|(_, dim_filters)| {
                !dim_filters.iter().all(|f| {
                    matches!(f.operator, FilterOperator::Eq | FilterOperator::In)
                        && f.values.len() == 1
                })
            })
            .map(|(dimension, _)| dimension.name.clone())
            .collect()
    }
}
