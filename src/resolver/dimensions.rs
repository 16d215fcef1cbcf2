//! Grouping dimensions and their show clauses

use indexmap::IndexSet;
use tracing::{debug, trace};
use crate::catalog::{Dimension, DimensionCatalog, DimensionField, LogicalTable};
use crate::error::RequestError;
use crate::request::{DimensionFieldSelection, PathSegment};
use super::accumulate::{reject_unless, resolve_each};

/// Matrix parameter holding a dimension's show clause
pub const SHOW_PARAM: &str = "show";
/// Show clause keyword selecting every field
pub const SHOW_ALL: &str = "all";
/// Show clause keyword selecting no fields
pub const SHOW_NONE: &str = "none";

/// Resolve dimension path segments, in request order
///
/// Duplicates collapse onto their first position. Every unknown name is
/// reported in one error.
pub fn resolve_dimensions<'a>(
    segments: &[PathSegment],
    catalog: &'a dyn DimensionCatalog,
) -> Result<IndexSet<&'a Dimension>, RequestError> {
    let names = segments.iter().map(|s| s.path.trim()).filter(|p| !p.is_empty());
    let dimensions = resolve_each(names, |name| catalog.dimension(name))
        .into_result(|unknown| {
            debug!(dimensions = ?unknown, "Undefined dimensions requested");
            RequestError::UnknownDimension(unknown)
        })?;

    let generated: IndexSet<&'a Dimension> = dimensions.into_iter().collect();
    trace!(dimensions = ?generated.iter().map(|d| &d.name).collect::<Vec<_>>(), "Generated dimensions");
    Ok(generated)
}

/// Check that every grouping dimension is available on the table
pub fn validate_dimensions_on_table(
    dimensions: &IndexSet<&Dimension>,
    table: &LogicalTable,
) -> Result<(), RequestError> {
    reject_unless(dimensions.iter().map(|d| d.name.as_str()), |name| table.has_dimension(name))
        .map_err(|missing| {
            debug!(table = %table.name, dimensions = ?missing, "Dimensions not on table");
            RequestError::DimensionNotOnTable {
                table: table.name.clone(),
                dimensions: missing,
            }
        })
}

/// Resolve the show clause of every dimension segment
///
/// Segments naming the same dimension have their field sets unioned, in
/// order of first appearance. Segments whose dimension does not exist are
/// skipped; [`resolve_dimensions`] reports those.
pub fn resolve_dimension_fields<'a>(
    segments: &[PathSegment],
    catalog: &'a dyn DimensionCatalog,
) -> Result<DimensionFieldSelection<'a>, RequestError> {
    let mut selection = DimensionFieldSelection::new();

    for segment in segments {
        let Some(dimension) = catalog.dimension(segment.path.trim()) else {
            continue;
        };
        let fields = bind_show_clause(segment, dimension)?;
        selection.entry(dimension).or_default().extend(fields);
    }

    Ok(selection)
}

/// Fields named by one segment's show clause
///
/// A clause that is exactly lowercase `all` or `none` selects every field or no
/// field. Anything else is a list of field names. No clause at all means
/// the dimension's default fields.
fn bind_show_clause<'a>(
    segment: &PathSegment,
    dimension: &'a Dimension,
) -> Result<IndexSet<&'a DimensionField>, RequestError> {
    let show_fields: Vec<&str> = segment
        .param(SHOW_PARAM)
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    match show_fields.as_slice() {
        [] => Ok(dimension.default_fields().into_iter().collect()),
        [only] if *only == SHOW_ALL => Ok(dimension.fields().iter().collect()),
        [only] if *only == SHOW_NONE => Ok(IndexSet::new()),
        names => resolve_each(names.iter(), |name| dimension.get_field(name))
            .into_result(|unknown| {
                debug!(dimension = %dimension.name, fields = ?unknown, "Undefined dimension fields requested");
                RequestError::UnknownDimensionField {
                    dimension: dimension.name.clone(),
                    fields: unknown,
                }
            })
            .map(|fields| fields.into_iter().collect()),
    }
}
