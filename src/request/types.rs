//! Types for resolved request components

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use indexmap::{IndexMap, IndexSet};
use crate::catalog::{Dimension, DimensionField, Metric};
use super::expr::FilterExpr;

/// Dimension → fields projected in the response, in output column order
pub type DimensionFieldSelection<'a> = IndexMap<&'a Dimension, IndexSet<&'a DimensionField>>;

/// Dimension → filters on it, implicitly ANDed
pub type ApiFilters<'a> = IndexMap<&'a Dimension, IndexSet<ApiFilter<'a>>>;

/// Metric → having predicates on it, implicitly ANDed
pub type Havings<'a> = IndexMap<LogicalMetric<'a>, Vec<ApiHaving<'a>>>;

/// Operator of a dimension filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Eq,
    In,
    NotIn,
    StartsWith,
    Contains,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    IsNull,
    NotNull,
}

impl FilterOperator {
    pub fn parse(text: &str) -> Option<Self> {
        let op = match text.to_ascii_lowercase().as_str() {
            "eq" => Self::Eq,
            "in" => Self::In,
            "notin" => Self::NotIn,
            "startswith" => Self::StartsWith,
            "contains" => Self::Contains,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "between" => Self::Between,
            "isnull" => Self::IsNull,
            "notnull" => Self::NotNull,
            _ => return None,
        };
        Some(op)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::In => "in",
            Self::NotIn => "notin",
            Self::StartsWith => "startswith",
            Self::Contains => "contains",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::IsNull => "isnull",
            Self::NotNull => "notnull",
        }
    }

    /// Check if this operator accepts a number of values
    pub fn accepts_arity(&self, count: usize) -> bool {
        match self {
            Self::Between => count == 2,
            Self::IsNull | Self::NotNull => count == 0,
            _ => count >= 1,
        }
    }
}

/// A filter on one field of a dimension
///
/// Values stay raw strings; the query engine coerces them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiFilter<'a> {
    pub dimension: &'a Dimension,
    pub field: &'a DimensionField,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

impl fmt::Display for ApiFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}-{}[{}]",
            self.dimension.name,
            self.field.name,
            self.operator.keyword(),
            self.values.join(",")
        )
    }
}

/// Operator of a having predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HavingOperator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    Between,
    NotBetween,
}

impl HavingOperator {
    pub fn parse(text: &str) -> Option<Self> {
        let op = match text.to_ascii_lowercase().as_str() {
            "eq" | "equalto" => Self::Eq,
            "neq" | "notequalto" => Self::NotEq,
            "gt" | "greaterthan" => Self::Gt,
            "gte" => Self::Gte,
            "lt" | "lessthan" => Self::Lt,
            "lte" => Self::Lte,
            "between" => Self::Between,
            "notbetween" => Self::NotBetween,
            _ => return None,
        };
        Some(op)
    }

    pub fn accepts_arity(&self, count: usize) -> bool {
        match self {
            Self::Between | Self::NotBetween => count == 2,
            _ => count >= 1,
        }
    }
}

/// A post-aggregation predicate on a requested metric
#[derive(Debug, Clone, PartialEq)]
pub struct ApiHaving<'a> {
    pub metric: LogicalMetric<'a>,
    pub operator: HavingOperator,
    pub values: Vec<f64>,
}

/// A requested metric, optionally narrowed by its own filters
///
/// The output name of a filtered metric is its normalized request token,
/// so `revenue` and `revenue(region|id-in[US])` can be requested together.
/// Identity is the output name.
#[derive(Debug, Clone)]
pub struct LogicalMetric<'a> {
    pub metric: &'a Metric,
    name: String,
    /// Filters embedded in the metric token
    pub filters: Option<Arc<ApiFilters<'a>>>,
    /// The embedded filters in query engine form
    pub filter: Option<Arc<FilterExpr>>,
}

impl<'a> LogicalMetric<'a> {
    pub fn new(metric: &'a Metric) -> Self {
        Self {
            metric,
            name: metric.name.clone(),
            filters: None,
            filter: None,
        }
    }

    pub fn filtered(metric: &'a Metric, name: String, filters: ApiFilters<'a>, filter: Option<FilterExpr>) -> Self {
        Self {
            metric,
            name,
            filters: Some(Arc::new(filters)),
            filter: filter.map(Arc::new),
        }
    }

    /// Output column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog name of the underlying metric
    pub fn api_name(&self) -> &str {
        &self.metric.name
    }

    pub fn is_filtered(&self) -> bool {
        self.filters.is_some()
    }
}

impl PartialEq for LogicalMetric<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for LogicalMetric<'_> {}

impl Hash for LogicalMetric<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse `asc`/`desc` (or the long forms), case-insensitively
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }
}

/// A sort on one output column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderByColumn {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderByColumn {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self { column: column.into(), direction }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    JsonApi,
    Csv,
}

impl ResponseFormat {
    pub fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonapi" => Some(Self::JsonApi),
            "csv" => Some(Self::Csv),
            _ => None,
        }
    }
}

/// How long a caller is willing to wait before the response goes asynchronous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AsyncAfter {
    /// Always wait for the synchronous response
    Never,
    /// Go asynchronous immediately
    Always,
    Millis(u64),
}

impl AsyncAfter {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "never" => Some(Self::Never),
            "always" => Some(Self::Always),
            millis => millis.parse().ok().map(Self::Millis),
        }
    }
}

/// Page selection requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaginationParameters {
    pub per_page: u32,
    pub page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_arity() {
        assert!(FilterOperator::Between.accepts_arity(2));
        assert!(!FilterOperator::Between.accepts_arity(3));
        assert!(FilterOperator::IsNull.accepts_arity(0));
        assert!(!FilterOperator::In.accepts_arity(0));
        assert!(FilterOperator::In.accepts_arity(4));
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!(FilterOperator::parse("NotIn"), Some(FilterOperator::NotIn));
        assert_eq!(HavingOperator::parse("greaterThan"), Some(HavingOperator::Gt));
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Descending));
        assert_eq!(ResponseFormat::parse("csv"), Some(ResponseFormat::Csv));
        assert_eq!(AsyncAfter::parse("1500"), Some(AsyncAfter::Millis(1500)));
        assert_eq!(AsyncAfter::parse("soon"), None);
    }

    #[test]
    fn test_metric_identity_is_output_name() {
        let revenue = Metric::new("revenue");
        let plain = LogicalMetric::new(&revenue);
        let filtered = LogicalMetric::filtered(&revenue, "revenue(region|id-in[US])".into(), ApiFilters::new(), None);
        assert_ne!(plain, filtered);
        assert_eq!(filtered.api_name(), "revenue");
        assert!(filtered.is_filtered());
    }
}
