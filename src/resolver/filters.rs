//! Dimension filters: `dimension|field-operator[value1,value2,...]`

use std::fmt;
use indexmap::IndexMap;
use tracing::{debug, trace};
use crate::catalog::{Dimension, DimensionCatalog, LogicalTable};
use crate::error::RequestError;
use crate::request::{ApiFilter, ApiFilters, FilterOperator};
use crate::tokens::{is_balanced, split_optional};
use super::accumulate::{reject_unless, resolve_each};

/// One filter token split into its parts, before catalog lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterClause<'t> {
    pub dimension: &'t str,
    pub field: &'t str,
    pub operator: FilterOperator,
    pub values: Vec<&'t str>,
}

impl fmt::Display for FilterClause<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}-{}[{}]",
            self.dimension,
            self.field,
            self.operator.keyword(),
            self.values.join(",")
        )
    }
}

/// Split a trailing `[v1,v2,...]` off a token
///
/// Returns the head and the trimmed, non-empty values. Brackets inside the
/// head (a filtered metric name) are allowed; brackets inside the values
/// are not.
pub(crate) fn split_values(token: &str) -> Option<(&str, Vec<&str>)> {
    let inner = token.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let (head, values) = (&inner[..open], &inner[open + 1..]);
    if values.contains(']') || head.is_empty() || !is_balanced(head) {
        return None;
    }
    let values = values.split(',').map(str::trim).filter(|v| !v.is_empty()).collect();
    Some((head, values))
}

/// Parse one filter token
pub fn parse_filter(token: &str) -> Result<FilterClause<'_>, RequestError> {
    let invalid = || {
        debug!(filter = token, "Filter does not match the filter grammar");
        RequestError::FilterSyntaxInvalid(token.to_string())
    };

    let (head, values) = split_values(token).ok_or_else(invalid)?;
    let (dimension, field_op) = head.split_once('|').ok_or_else(invalid)?;
    let (field, operator) = field_op.rsplit_once('-').ok_or_else(invalid)?;
    let (dimension, field) = (dimension.trim(), field.trim());
    if dimension.is_empty() || field.is_empty() {
        return Err(invalid());
    }
    let operator = FilterOperator::parse(operator.trim()).ok_or_else(invalid)?;
    if !operator.accepts_arity(values.len()) {
        return Err(invalid());
    }

    Ok(FilterClause { dimension, field, operator, values })
}

/// Resolve a filter parameter into per-dimension filter sets
///
/// Stops at the first token that does not parse. After that every unknown
/// dimension, then every unknown field, then every dimension missing from
/// the table is collected into one error.
pub fn resolve_filters<'a>(
    raw: Option<&str>,
    table: &LogicalTable,
    catalog: &'a dyn DimensionCatalog,
) -> Result<ApiFilters<'a>, RequestError> {
    let clauses = split_optional(raw)
        .into_iter()
        .map(parse_filter)
        .collect::<Result<Vec<_>, _>>()?;
    resolve_clauses(&clauses, table, catalog)
}

/// Resolve already parsed filter clauses against the catalog and table
pub fn resolve_clauses<'a>(
    clauses: &[FilterClause<'_>],
    table: &LogicalTable,
    catalog: &'a dyn DimensionCatalog,
) -> Result<ApiFilters<'a>, RequestError> {
    let dimensions: Vec<&'a Dimension> = resolve_each(clauses.iter().map(|c| c.dimension), |name| {
        catalog.dimension(name)
    })
    .into_result(|unknown| {
        debug!(dimensions = ?unknown, "Undefined filter dimensions");
        RequestError::UnknownFilterDimension(unknown)
    })?;

    // Unknown fields grouped per dimension; the first dimension with any is reported
    let mut unknown_fields: IndexMap<&str, Vec<String>> = IndexMap::new();
    let mut filters = ApiFilters::new();
    for (clause, dimension) in clauses.iter().zip(dimensions) {
        match dimension.get_field(clause.field) {
            Some(field) => {
                filters.entry(dimension).or_default().insert(ApiFilter {
                    dimension,
                    field,
                    operator: clause.operator,
                    values: clause.values.iter().map(|v| v.to_string()).collect(),
                });
            }
            None => {
                let fields = unknown_fields.entry(dimension.name.as_str()).or_default();
                if !fields.iter().any(|f| f == clause.field) {
                    fields.push(clause.field.to_string());
                }
            }
        }
    }
    if let Some((dimension, fields)) = unknown_fields.into_iter().next() {
        debug!(dimension, fields = ?fields, "Undefined filter dimension fields");
        return Err(RequestError::UnknownFilterDimensionField {
            dimension: dimension.to_string(),
            fields,
        });
    }

    reject_unless(filters.keys().map(|d| d.name.as_str()), |name| table.has_dimension(name))
        .map_err(|missing| {
            debug!(table = %table.name, dimensions = ?missing, "Filter dimensions not on table");
            RequestError::FilterDimensionNotOnTable {
                table: table.name.clone(),
                dimensions: missing,
            }
        })?;

    trace!(filters = filters.values().flatten().count(), "Generated filters");
    Ok(filters)
}
