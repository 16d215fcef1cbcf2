//! Request types (nouns)
//!
//! The raw request as the transport layer hands it over, the resolved
//! components, and the compiled request they are assembled into.

mod compiled;
mod expr;
mod raw;
mod types;

pub use compiled::{CompiledRequest, RequestParts};
pub use expr::{FilterExpr, HavingExpr, SearchMode};
pub use raw::{PathSegment, RawRequest};
pub use types::{
    ApiFilter, ApiFilters, ApiHaving, AsyncAfter, DimensionFieldSelection, FilterOperator,
    HavingOperator, Havings, LogicalMetric, OrderByColumn, PaginationParameters, ResponseFormat,
    SortDirection,
};
