//! Root catalog definition and lookup traits

use std::fmt;
use std::path::Path;
use serde::Deserialize;
use crate::error::ParseError;
use crate::time::Granularity;
use super::dimension::{Dimension, DimensionField, DimensionFields};
use super::metric::Metric;
use super::table::LogicalTable;

/// Looks up dimensions by API name
pub trait DimensionCatalog: Send + Sync + fmt::Debug {
    fn dimension(&self, name: &str) -> Option<&Dimension>;
}

/// Looks up metrics by API name
pub trait MetricCatalog: Send + Sync + fmt::Debug {
    fn metric(&self, name: &str) -> Option<&Metric>;
}

/// Looks up logical tables by name and granularity
pub trait TableCatalog: Send + Sync + fmt::Debug {
    fn table(&self, name: &str, granularity: &Granularity) -> Option<&LogicalTable>;
}

/// The root catalog: dimensions, metrics and the tables that expose them
///
/// Loaded once by configuration code and then shared read-only between
/// any number of concurrent compilations.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    /// Named field lists that dimensions can reference instead of listing fields
    #[serde(rename = "fieldSets", default)]
    pub field_sets: Vec<FieldSet>,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub metrics: Vec<Metric>,
    #[serde(default)]
    pub tables: Vec<LogicalTable>,
}

/// A reusable list of dimension fields
#[derive(Debug, Deserialize)]
pub struct FieldSet {
    pub name: String,
    pub fields: Vec<DimensionField>,
}

impl Catalog {
    /// Load a catalog from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        crate::parser::parse_file(path)
    }

    /// Replace field-set references with the fields they name and check
    /// that default fields exist
    pub fn link(mut self) -> Result<Self, ParseError> {
        for dimension in &mut self.dimensions {
            if let DimensionFields::Template(template) = &dimension.fields {
                let set = self
                    .field_sets
                    .iter()
                    .find(|s| &s.name == template)
                    .ok_or_else(|| ParseError::UnknownFieldSet {
                        dimension: dimension.name.clone(),
                        template: template.clone(),
                    })?;
                dimension.fields = DimensionFields::List(set.fields.clone());
            }

            if let Some(defaults) = &dimension.default_fields {
                let missing: Vec<String> = defaults
                    .iter()
                    .filter(|name| dimension.get_field(name).is_none())
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(ParseError::UnknownDefaultFields {
                        dimension: dimension.name.clone(),
                        fields: missing,
                    });
                }
            }
        }
        Ok(self)
    }

    /// Get a dimension by name
    pub fn get_dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.name == name)
    }

    /// Get a metric by name
    pub fn get_metric(&self, name: &str) -> Option<&Metric> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Get a table by name, regardless of granularity
    pub fn get_table(&self, name: &str) -> Option<&LogicalTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl DimensionCatalog for Catalog {
    fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.get_dimension(name)
    }
}

impl MetricCatalog for Catalog {
    fn metric(&self, name: &str) -> Option<&Metric> {
        self.get_metric(name)
    }
}

impl TableCatalog for Catalog {
    fn table(&self, name: &str, granularity: &Granularity) -> Option<&LogicalTable> {
        self.tables
            .iter()
            .find(|t| t.name == name && t.has_granularity(granularity.keyword()))
    }
}
