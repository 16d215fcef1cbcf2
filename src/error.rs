//! Error types for semreq

use thiserror::Error;

/// Errors that can occur while loading catalogs or configuration
#[derive(Debug, Error)]
pub enum ParseError {
    /// IO error reading file
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    /// YAML deserialization error
    #[error("Invalid YAML: {source}")]
    Yaml {
        #[from]
        source: serde_yaml::Error,
    },
    /// A dimension references a field-set template that is not defined
    #[error("Dimension '{dimension}' references undefined field set '{template}'")]
    UnknownFieldSet { dimension: String, template: String },
    /// A dimension's default fields are not among its fields
    #[error("Dimension '{dimension}' has default fields {fields:?} that are not among its fields")]
    UnknownDefaultFields { dimension: String, fields: Vec<String> },
    /// A configured value could not be interpreted
    #[error("Invalid configuration value for '{key}': {value}")]
    InvalidConfig { key: String, value: String },
}

/// Tag identifying the kind of a [`RequestError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    TimeZoneInvalid,
    GranularityInvalid,
    TableUndefined,
    UnknownDimension,
    DimensionNotOnTable,
    UnknownDimensionField,
    MetricsMissing,
    UnknownMetric,
    MetricNotOnTable,
    FilterSyntaxInvalid,
    UnknownFilterDimension,
    UnknownFilterDimensionField,
    FilterDimensionNotOnTable,
    HavingSyntaxInvalid,
    HavingMetricUndefined,
    HavingNonNumeric,
    IntervalsMissing,
    IntervalInvalid,
    IntervalNotAligned,
    SortDirectionInvalid,
    DateTimeSortNotFirst,
    UnknownSortMetric,
    IntegerInvalid,
    PerBucketLimitRequiresSort,
    AggregatabilityViolation,
    FormatInvalid,
    AsyncAfterInvalid,
}

/// Errors that can occur while compiling a request
///
/// Every variant is a client error: the request as written cannot be served
/// and retrying it unchanged will fail the same way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Time zone '{0}' is unknown")]
    TimeZoneInvalid(String),
    #[error("'{0}' is not a valid granularity")]
    GranularityInvalid(String),
    #[error("Table '{table}' is undefined for granularity '{granularity}'")]
    TableUndefined { table: String, granularity: String },
    #[error("Dimension(s) {} do not exist", quoted(.0))]
    UnknownDimension(Vec<String>),
    #[error("Dimension(s) {} are not available on table '{table}'", quoted(.dimensions))]
    DimensionNotOnTable { table: String, dimensions: Vec<String> },
    #[error("Dimension field(s) {} do not exist for dimension '{dimension}'", quoted(.fields))]
    UnknownDimensionField { dimension: String, fields: Vec<String> },
    #[error("At least one metric is required")]
    MetricsMissing,
    #[error("Metric(s) {} do not exist", quoted(.0))]
    UnknownMetric(Vec<String>),
    #[error("Metric(s) {} are not available on table '{table}'", quoted(.metrics))]
    MetricNotOnTable { table: String, metrics: Vec<String> },
    #[error("Filter '{0}' does not match the syntax dimension|field-operator[values]")]
    FilterSyntaxInvalid(String),
    #[error("Filter dimension(s) {} do not exist", quoted(.0))]
    UnknownFilterDimension(Vec<String>),
    #[error("Filter field(s) {} do not exist for dimension '{dimension}'", quoted(.fields))]
    UnknownFilterDimensionField { dimension: String, fields: Vec<String> },
    #[error("Filter dimension(s) {} are not available on table '{table}'", quoted(.dimensions))]
    FilterDimensionNotOnTable { table: String, dimensions: Vec<String> },
    #[error("Having '{0}' does not match the syntax metric-operator[values]")]
    HavingSyntaxInvalid(String),
    #[error("Having metric(s) {} are not part of the query", quoted(.0))]
    HavingMetricUndefined(Vec<String>),
    #[error("Having '{0}' has a non-numeric value")]
    HavingNonNumeric(String),
    #[error("At least one interval is required")]
    IntervalsMissing,
    #[error("Interval '{interval}' is invalid: {reason}")]
    IntervalInvalid { interval: String, reason: String },
    #[error("Interval(s) {} do not align to granularity '{granularity}'", quoted(.intervals))]
    IntervalNotAligned { granularity: String, intervals: Vec<String> },
    #[error("Sort direction '{direction}' for column '{column}' is invalid, expected asc or desc")]
    SortDirectionInvalid { column: String, direction: String },
    #[error("Sort on '{0}' must be the first sort column")]
    DateTimeSortNotFirst(String),
    #[error("Sort metric(s) {} are not part of the query", quoted(.0))]
    UnknownSortMetric(Vec<String>),
    #[error("Value '{value}' for '{parameter}' is not a non-negative integer")]
    IntegerInvalid { parameter: String, value: String },
    #[error("topN of {0} requires at least one metric sort column")]
    PerBucketLimitRequiresSort(u32),
    #[error("Dimension(s) {} are not aggregatable: group by them or filter them to a single value", quoted(.0))]
    AggregatabilityViolation(Vec<String>),
    #[error("Response format '{0}' is not supported")]
    FormatInvalid(String),
    #[error("asyncAfter value '{0}' must be 'never', 'always' or a number of milliseconds")]
    AsyncAfterInvalid(String),
}

impl RequestError {
    /// The kind tag of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TimeZoneInvalid(_) => ErrorKind::TimeZoneInvalid,
            Self::GranularityInvalid(_) => ErrorKind::GranularityInvalid,
            Self::TableUndefined { .. } => ErrorKind::TableUndefined,
            Self::UnknownDimension(_) => ErrorKind::UnknownDimension,
            Self::DimensionNotOnTable { .. } => ErrorKind::DimensionNotOnTable,
            Self::UnknownDimensionField { .. } => ErrorKind::UnknownDimensionField,
            Self::MetricsMissing => ErrorKind::MetricsMissing,
            Self::UnknownMetric(_) => ErrorKind::UnknownMetric,
            Self::MetricNotOnTable { .. } => ErrorKind::MetricNotOnTable,
            Self::FilterSyntaxInvalid(_) => ErrorKind::FilterSyntaxInvalid,
            Self::UnknownFilterDimension(_) => ErrorKind::UnknownFilterDimension,
            Self::UnknownFilterDimensionField { .. } => ErrorKind::UnknownFilterDimensionField,
            Self::FilterDimensionNotOnTable { .. } => ErrorKind::FilterDimensionNotOnTable,
            Self::HavingSyntaxInvalid(_) => ErrorKind::HavingSyntaxInvalid,
            Self::HavingMetricUndefined(_) => ErrorKind::HavingMetricUndefined,
            Self::HavingNonNumeric(_) => ErrorKind::HavingNonNumeric,
            Self::IntervalsMissing => ErrorKind::IntervalsMissing,
            Self::IntervalInvalid { .. } => ErrorKind::IntervalInvalid,
            Self::IntervalNotAligned { .. } => ErrorKind::IntervalNotAligned,
            Self::SortDirectionInvalid { .. } => ErrorKind::SortDirectionInvalid,
            Self::DateTimeSortNotFirst(_) => ErrorKind::DateTimeSortNotFirst,
            Self::UnknownSortMetric(_) => ErrorKind::UnknownSortMetric,
            Self::IntegerInvalid { .. } => ErrorKind::IntegerInvalid,
            Self::PerBucketLimitRequiresSort(_) => ErrorKind::PerBucketLimitRequiresSort,
            Self::AggregatabilityViolation(_) => ErrorKind::AggregatabilityViolation,
            Self::FormatInvalid(_) => ErrorKind::FormatInvalid,
            Self::AsyncAfterInvalid(_) => ErrorKind::AsyncAfterInvalid,
        }
    }

    /// Every compile error is caused by the request, never by the server
    pub fn is_client_error(&self) -> bool {
        true
    }
}

fn quoted(names: &[String]) -> String {
    let quoted: Vec<String> = names.iter().map(|n| format!("'{}'", n)).collect();
    format!("[{}]", quoted.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_lists_every_name() {
        let err = RequestError::UnknownDimension(vec!["foo".into(), "bar".into()]);
        assert_eq!(err.to_string(), "Dimension(s) ['foo', 'bar'] do not exist");
        assert_eq!(err.kind(), ErrorKind::UnknownDimension);
    }

    #[test]
    fn test_field_error_names_dimension() {
        let err = RequestError::UnknownDimensionField {
            dimension: "region".into(),
            fields: vec!["colour".into()],
        };
        assert!(err.to_string().contains("'region'"));
        assert!(err.to_string().contains("'colour'"));
    }
}
