//! Sort columns: `column|direction` or bare `column`

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};
use crate::error::RequestError;
use crate::request::{LogicalMetric, OrderByColumn, SortDirection};
use crate::tokens::{split_last_top_level, split_optional};
use super::accumulate::reject_unless;
use super::metrics::metric_output_name;

/// Resolved sorts with the time-axis sort split out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSorts {
    pub date_time_sort: Option<OrderByColumn>,
    pub sorts: IndexSet<OrderByColumn>,
}

/// Resolve the sort parameter
///
/// `date_time_column` may only be the first sort and is returned apart from
/// the metric sorts. Every other column must name a requested metric; every
/// one that does not is reported in one error. A repeated column keeps its
/// first position and its last direction.
pub fn resolve_sorts(
    raw: Option<&str>,
    metrics: &IndexSet<LogicalMetric<'_>>,
    date_time_column: &str,
    default_direction: SortDirection,
) -> Result<ResolvedSorts, RequestError> {
    let mut columns: IndexMap<String, SortDirection> = IndexMap::new();
    for token in split_optional(raw) {
        let (column, direction) = match split_last_top_level(token, '|') {
            Some((column, direction)) => {
                let (column, direction) = (column.trim(), direction.trim());
                let direction = SortDirection::parse(direction).ok_or_else(|| {
                    debug!(column, direction, "Invalid sort direction");
                    RequestError::SortDirectionInvalid {
                        column: column.to_string(),
                        direction: direction.to_string(),
                    }
                })?;
                (column, direction)
            }
            None => (token, default_direction),
        };
        columns.insert(metric_output_name(column), direction);
    }

    let mut resolved = ResolvedSorts::default();
    if let Some(index) = columns.get_index_of(date_time_column) {
        if index != 0 {
            debug!(column = date_time_column, "Time-axis sort is not the first sort");
            return Err(RequestError::DateTimeSortNotFirst(date_time_column.to_string()));
        }
        if let Some((column, direction)) = columns.shift_remove_index(0) {
            resolved.date_time_sort = Some(OrderByColumn::new(column, direction));
        }
    }

    reject_unless(columns.keys(), |column| metrics.iter().any(|m| m.name() == column))
        .map_err(|unknown| {
            debug!(metrics = ?unknown, "Sorts on metrics that are not requested");
            RequestError::UnknownSortMetric(unknown)
        })?;

    resolved.sorts = columns
        .into_iter()
        .map(|(column, direction)| OrderByColumn::new(column, direction))
        .collect();
    trace!(sorts = ?resolved.sorts, date_time_sort = ?resolved.date_time_sort, "Generated sorts");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Metric;
    use pretty_assertions::assert_eq;

    fn resolve(raw: &str, metrics: &IndexSet<LogicalMetric<'_>>) -> Result<ResolvedSorts, RequestError> {
        resolve_sorts(Some(raw), metrics, "dateTime", SortDirection::Descending)
    }

    #[test]
    fn test_sorts_split_out_date_time() {
        let (revenue, clicks) = (Metric::new("revenue"), Metric::new("clicks"));
        let metrics: IndexSet<_> = [LogicalMetric::new(&revenue), LogicalMetric::new(&clicks)].into_iter().collect();

        let resolved = resolve("dateTime|ASC,revenue,clicks|asc", &metrics).unwrap();
        assert_eq!(resolved.date_time_sort, Some(OrderByColumn::new("dateTime", SortDirection::Ascending)));
        assert_eq!(
            resolved.sorts.into_iter().collect::<Vec<_>>(),
            vec![
                OrderByColumn::new("revenue", SortDirection::Descending),
                OrderByColumn::new("clicks", SortDirection::Ascending),
            ]
        );
    }

    #[test]
    fn test_repeated_column_keeps_position_and_last_direction() {
        let (revenue, clicks) = (Metric::new("revenue"), Metric::new("clicks"));
        let metrics: IndexSet<_> = [LogicalMetric::new(&revenue), LogicalMetric::new(&clicks)].into_iter().collect();

        let resolved = resolve("revenue|asc,clicks,revenue|desc", &metrics).unwrap();
        assert_eq!(
            resolved.sorts.into_iter().collect::<Vec<_>>(),
            vec![
                OrderByColumn::new("revenue", SortDirection::Descending),
                OrderByColumn::new("clicks", SortDirection::Descending),
            ]
        );
    }

    #[test]
    fn test_filtered_metric_sort() {
        let revenue = Metric::new("revenue");
        let filtered = LogicalMetric::filtered(&revenue, "revenue(region|id-in[US])".into(), Default::default(), None);
        let metrics: IndexSet<_> = [filtered].into_iter().collect();

        let resolved = resolve("revenue(region|id-in[US])|asc", &metrics).unwrap();
        assert_eq!(resolved.sorts[0].column, "revenue(region|id-in[US])");
    }

    #[test]
    fn test_sort_errors() {
        let revenue = Metric::new("revenue");
        let metrics: IndexSet<_> = [LogicalMetric::new(&revenue)].into_iter().collect();

        assert_eq!(
            resolve("revenue,dateTime", &metrics),
            Err(RequestError::DateTimeSortNotFirst("dateTime".into()))
        );
        assert_eq!(
            resolve("revenue|sideways", &metrics),
            Err(RequestError::SortDirectionInvalid {
                column: "revenue".into(),
                direction: "sideways".into(),
            })
        );
        assert_eq!(
            resolve("clicks,revenue,views|asc", &metrics),
            Err(RequestError::UnknownSortMetric(vec!["clicks".into(), "views".into()]))
        );
        assert_eq!(resolve_sorts(None, &metrics, "dateTime", SortDirection::Descending), Ok(ResolvedSorts::default()));
    }
}
