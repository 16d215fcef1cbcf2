//! Catalog types (nouns)
//!
//! The dictionaries a request is resolved against. The compiler only ever
//! borrows from these.

mod dimension;
mod metric;
mod schema;
mod table;

pub use dimension::{Dimension, DimensionField, DimensionFields};
pub use metric::Metric;
pub use schema::{Catalog, FieldSet, DimensionCatalog, MetricCatalog, TableCatalog};
pub use table::LogicalTable;
