//! Requested metrics, plain (`revenue`) or filtered (`revenue(region|id-in[US])`)

use indexmap::IndexSet;
use tracing::{debug, trace};
use crate::catalog::{DimensionCatalog, LogicalTable, Metric, MetricCatalog};
use crate::error::RequestError;
use crate::request::LogicalMetric;
use crate::tokens::{is_balanced, split_list, split_optional};
use super::accumulate::{reject_unless, resolve_each};
use super::filter_builder::FilterBuilder;
use super::filters::{parse_filter, resolve_clauses, FilterClause};

/// A metric token split into its name and embedded filter clauses
#[derive(Debug)]
struct MetricToken<'t> {
    name: &'t str,
    filters: Option<Vec<FilterClause<'t>>>,
}

fn parse_metric_token(token: &str) -> Result<MetricToken<'_>, RequestError> {
    let Some(open) = token.find('(') else {
        return Ok(MetricToken { name: token, filters: None });
    };
    let invalid = || {
        debug!(metric = token, "Metric filter does not match the filter grammar");
        RequestError::FilterSyntaxInvalid(token.to_string())
    };

    let body = token[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
    if !is_balanced(body) {
        return Err(invalid());
    }
    let body = strip_and(body);
    let clauses = split_list(body)
        .into_iter()
        .map(parse_filter)
        .collect::<Result<Vec<_>, _>>()?;
    if clauses.is_empty() {
        return Err(invalid());
    }

    Ok(MetricToken {
        name: token[..open].trim(),
        filters: Some(clauses),
    })
}

impl MetricToken<'_> {
    /// Output column name, with filters in canonical form
    fn output_name(&self) -> String {
        match &self.filters {
            None => self.name.to_string(),
            Some(clauses) => {
                let clauses: Vec<String> = clauses.iter().map(ToString::to_string).collect();
                format!("{}({})", self.name, clauses.join(","))
            }
        }
    }
}

/// The output column name a metric reference stands for
///
/// Spacing, operator case and an `AND(...)` wrapper do not change the name
/// of a filtered metric. References that do not parse come back trimmed.
pub fn metric_output_name(reference: &str) -> String {
    let reference = reference.trim();
    parse_metric_token(reference)
        .map(|token| token.output_name())
        .unwrap_or_else(|_| reference.to_string())
}

/// Unwrap an optional `AND(...)` around a filter list
fn strip_and(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("AND(") && trimmed.ends_with(')') => {
            &trimmed[4..trimmed.len() - 1]
        }
        _ => trimmed,
    }
}

/// Resolve the metrics parameter
///
/// At least one metric is required. Every unknown metric name is reported
/// in one error, then every metric missing from the table. Embedded filters
/// are resolved like request filters and turned into query engine filters
/// by `filter_builder`.
pub fn resolve_metrics<'a>(
    raw: Option<&str>,
    metrics: &'a dyn MetricCatalog,
    dimensions: &'a dyn DimensionCatalog,
    table: &LogicalTable,
    filter_builder: &dyn FilterBuilder,
) -> Result<IndexSet<LogicalMetric<'a>>, RequestError> {
    let tokens = split_optional(raw);
    if tokens.is_empty() {
        debug!("No metrics requested");
        return Err(RequestError::MetricsMissing);
    }

    let parsed = tokens
        .into_iter()
        .map(parse_metric_token)
        .collect::<Result<Vec<_>, _>>()?;

    let catalog_metrics: Vec<&'a Metric> = resolve_each(parsed.iter().map(|t| t.name), |name| metrics.metric(name))
        .into_result(|unknown| {
            debug!(metrics = ?unknown, "Undefined metrics requested");
            RequestError::UnknownMetric(unknown)
        })?;

    reject_unless(catalog_metrics.iter().map(|m| m.name.as_str()), |name| table.has_metric(name))
        .map_err(|missing| {
            debug!(table = %table.name, metrics = ?missing, "Metrics not on table");
            RequestError::MetricNotOnTable {
                table: table.name.clone(),
                metrics: missing,
            }
        })?;

    let mut generated = IndexSet::new();
    for (token, metric) in parsed.iter().zip(catalog_metrics) {
        let logical = match &token.filters {
            None => LogicalMetric::new(metric),
            Some(clauses) => {
                let filters = resolve_clauses(clauses, table, dimensions)?;
                let filter = filter_builder.build_filters(&filters);
                LogicalMetric::filtered(metric, token.output_name(), filters, filter)
            }
        };
        generated.insert(logical);
    }

    trace!(metrics = ?generated.iter().map(|m| m.name()).collect::<Vec<_>>(), "Generated logical metrics");
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::FilterOperator;

    #[test]
    fn test_plain_token() {
        let parsed = parse_metric_token("revenue").unwrap();
        assert_eq!(parsed.name, "revenue");
        assert!(parsed.filters.is_none());
    }

    #[test]
    fn test_filtered_token() {
        let parsed = parse_metric_token("revenue(AND(region|id-in[US,CA],product|desc-eq[toy]))").unwrap();
        assert_eq!(parsed.name, "revenue");
        let clauses = parsed.filters.unwrap();
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].values, vec!["US", "CA"]);
        assert_eq!(clauses[1].operator, FilterOperator::Eq);
    }

    #[test]
    fn test_output_name_is_canonical() {
        for reference in [
            "revenue(region|id-in[US,CA])",
            " revenue( region | id-IN[US, CA] )",
            "revenue(AND(region|id-in[ US ,CA]))",
        ] {
            assert_eq!(metric_output_name(reference), "revenue(region|id-in[US,CA])", "{reference}");
        }
        assert_eq!(metric_output_name(" clicks "), "clicks");
        assert_eq!(metric_output_name("revenue(region"), "revenue(region");
    }

    #[test]
    fn test_malformed_filtered_token() {
        for token in ["revenue(region|id-in[US]", "revenue()"] {
            assert_eq!(
                parse_metric_token(token).map(|_| ()),
                Err(RequestError::FilterSyntaxInvalid(token.to_string())),
                "{token}"
            );
        }
        assert_eq!(
            parse_metric_token("revenue(region)").map(|_| ()),
            Err(RequestError::FilterSyntaxInvalid("region".to_string()))
        );
    }
}
