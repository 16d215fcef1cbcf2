//! Cross-field validation (verb module)
//!
//! Rules that need more than one resolved field. They run after every
//! resolver has succeeded, and again from [`CompiledRequest::validate`] for
//! requests assembled from parts or derived from another request.

use indexmap::IndexSet;
use tracing::debug;
use crate::catalog::{Dimension, LogicalTable};
use crate::error::RequestError;
use crate::request::{ApiFilters, CompiledRequest, OrderByColumn};
use crate::time::{Granularity, Interval};

/// Parse a row limit parameter; absent or empty means unset (0)
pub fn parse_limit(raw: Option<&str>, parameter: &str) -> Result<u32, RequestError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(0),
        Some(value) => value.parse::<u32>().map_err(|_| {
            debug!(parameter, value, "Limit is not a non-negative integer");
            RequestError::IntegerInvalid {
                parameter: parameter.to_string(),
                value: value.to_string(),
            }
        }),
    }
}

/// A per-bucket limit needs a metric sort to rank rows by
pub fn validate_top_n(top_n: u32, sorts: &IndexSet<OrderByColumn>) -> Result<(), RequestError> {
    if top_n > 0 && sorts.is_empty() {
        debug!(top_n, "topN without a metric sort");
        return Err(RequestError::PerBucketLimitRequiresSort(top_n));
    }
    Ok(())
}

/// Filtered dimensions that cannot be aggregated away must be grouped or pinned
pub fn validate_aggregatability(
    table: &LogicalTable,
    dimensions: &IndexSet<&Dimension>,
    filters: &ApiFilters<'_>,
) -> Result<(), RequestError> {
    let violations = table.aggregatability_violations(dimensions, filters);
    if violations.is_empty() {
        Ok(())
    } else {
        debug!(dimensions = ?violations, "Non-aggregatable dimensions neither grouped nor pinned");
        Err(RequestError::AggregatabilityViolation(violations))
    }
}

/// Every interval must start and end on a bucket boundary
pub fn validate_time_alignment(
    granularity: &Granularity,
    intervals: &IndexSet<Interval>,
) -> Result<(), RequestError> {
    let unaligned: Vec<String> = intervals
        .iter()
        .filter(|interval| !granularity.is_aligned(interval))
        .map(ToString::to_string)
        .collect();
    if unaligned.is_empty() {
        Ok(())
    } else {
        debug!(granularity = %granularity, intervals = ?unaligned, "Intervals not aligned to granularity");
        Err(RequestError::IntervalNotAligned {
            granularity: granularity.to_string(),
            intervals: unaligned,
        })
    }
}

/// Run every cross-field rule over a request
pub fn validate_request(request: &CompiledRequest<'_>) -> Result<(), RequestError> {
    validate_top_n(request.top_n().unwrap_or(0), request.sorts())?;
    validate_aggregatability(request.table(), request.dimensions(), request.filters())?;
    validate_time_alignment(request.granularity(), request.intervals())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Tz;
    use crate::catalog::{DimensionField, DimensionFields};
    use crate::request::{ApiFilter, FilterOperator, SortDirection};
    use crate::time::TimeGrain;

    fn dimension(name: &str, aggregatable: bool) -> Dimension {
        Dimension {
            name: name.into(),
            description: None,
            fields: DimensionFields::List(vec![DimensionField::new("id")]),
            default_fields: None,
            aggregatable,
        }
    }

    fn table() -> LogicalTable {
        LogicalTable {
            name: "sales".into(),
            description: None,
            granularities: vec!["day".into()],
            dimensions: vec!["region".into(), "store".into()],
            metrics: vec!["revenue".into()],
        }
    }

    fn filters<'a>(dim: &'a Dimension, operator: FilterOperator, values: &[&str]) -> ApiFilters<'a> {
        let mut filters = ApiFilters::new();
        filters.entry(dim).or_default().insert(ApiFilter {
            dimension: dim,
            field: &dim.fields()[0],
            operator,
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        filters
    }

    #[test]
    fn test_parse_limit() {
        assert_eq!(parse_limit(None, "count"), Ok(0));
        assert_eq!(parse_limit(Some(""), "topN"), Ok(0));
        assert_eq!(parse_limit(Some(" 10 "), "count"), Ok(10));
        assert_eq!(
            parse_limit(Some("-3"), "count"),
            Err(RequestError::IntegerInvalid {
                parameter: "count".into(),
                value: "-3".into(),
            })
        );
    }

    #[test]
    fn test_top_n_requires_sort() {
        let mut sorts = IndexSet::new();
        assert_eq!(validate_top_n(5, &sorts), Err(RequestError::PerBucketLimitRequiresSort(5)));
        assert_eq!(validate_top_n(0, &sorts), Ok(()));
        sorts.insert(OrderByColumn::new("revenue", SortDirection::Descending));
        assert_eq!(validate_top_n(5, &sorts), Ok(()));
    }

    #[test]
    fn test_non_aggregatable_dimension_must_be_pinned_or_grouped() {
        let store = dimension("store", false);
        let table = table();
        let grouped: IndexSet<&Dimension> = [&store].into_iter().collect();

        let wide = filters(&store, FilterOperator::In, &["1", "2"]);
        assert_eq!(
            validate_aggregatability(&table, &IndexSet::new(), &wide),
            Err(RequestError::AggregatabilityViolation(vec!["store".into()]))
        );
        assert_eq!(validate_aggregatability(&table, &grouped, &wide), Ok(()));

        let pinned = filters(&store, FilterOperator::Eq, &["1"]);
        assert_eq!(validate_aggregatability(&table, &IndexSet::new(), &pinned), Ok(()));

        let region = dimension("region", true);
        let aggregatable = filters(&region, FilterOperator::NotIn, &["1", "2"]);
        assert_eq!(validate_aggregatability(&table, &IndexSet::new(), &aggregatable), Ok(()));
    }

    #[test]
    fn test_time_alignment() {
        let week = Granularity::zoned(TimeGrain::Week, Tz::UTC);
        let thursday = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let monday = Utc.with_ymd_and_hms(2020, 1, 6, 0, 0, 0).unwrap();
        let next_monday = Utc.with_ymd_and_hms(2020, 1, 13, 0, 0, 0).unwrap();

        let aligned: IndexSet<_> = [Interval::new(monday, next_monday).unwrap()].into_iter().collect();
        assert_eq!(validate_time_alignment(&week, &aligned), Ok(()));

        let unaligned: IndexSet<_> = [Interval::new(thursday, monday).unwrap()].into_iter().collect();
        assert_eq!(
            validate_time_alignment(&week, &unaligned),
            Err(RequestError::IntervalNotAligned {
                granularity: "week".into(),
                intervals: vec!["2020-01-02T00:00:00Z/2020-01-06T00:00:00Z".into()],
            })
        );
        assert_eq!(validate_time_alignment(&Granularity::All, &unaligned), Ok(()));
    }
}
