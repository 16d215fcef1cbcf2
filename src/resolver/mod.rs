//! Request resolution (verb module)
//!
//! One resolver per request parameter. Each turns raw tokens into typed,
//! catalog-bound values, collecting every bad token of a kind before
//! failing.

mod accumulate;
mod dimensions;
mod filter_builder;
mod filters;
mod havings;
mod metrics;
mod output;
mod sorts;
mod time;

pub use accumulate::{reject_unless, resolve_each, Resolution};
pub use dimensions::{
    resolve_dimension_fields, resolve_dimensions, validate_dimensions_on_table, SHOW_ALL,
    SHOW_NONE, SHOW_PARAM,
};
pub use filter_builder::{DefaultFilterBuilder, FilterBuilder};
pub use filters::{parse_filter, resolve_clauses, resolve_filters, FilterClause};
pub use havings::{build_having, DefaultHavingResolver, HavingResolver};
pub use metrics::{metric_output_name, resolve_metrics};
pub use output::{resolve_async_after, resolve_format};
pub use sorts::{resolve_sorts, ResolvedSorts};
pub use time::{resolve_granularity, resolve_intervals, resolve_time_zone, CURRENT, LATEST, NEXT};
