//! The compiled, immutable request

use std::sync::Arc;
use chrono_tz::Tz;
use indexmap::IndexSet;
use url::Url;
use crate::catalog::{Dimension, LogicalTable};
use crate::error::RequestError;
use crate::resolver::{FilterBuilder, HavingResolver};
use crate::time::{Granularity, Interval};
use crate::validator;
use super::expr::HavingExpr;
use super::types::{
    ApiFilters, AsyncAfter, DimensionFieldSelection, Havings, LogicalMetric, OrderByColumn,
    PaginationParameters, ResponseFormat,
};

/// Every field of a [`CompiledRequest`]
///
/// Used to assemble a request directly, and returned by
/// [`CompiledRequest::to_parts`] to seed one from another.
#[derive(Debug, Clone)]
pub struct RequestParts<'a> {
    pub format: ResponseFormat,
    pub pagination: Option<PaginationParameters>,
    pub uri: Arc<Url>,
    pub table: &'a LogicalTable,
    pub granularity: Granularity,
    pub dimensions: Arc<IndexSet<&'a Dimension>>,
    pub dimension_fields: Arc<DimensionFieldSelection<'a>>,
    pub metrics: Arc<IndexSet<LogicalMetric<'a>>>,
    pub intervals: Arc<IndexSet<Interval>>,
    pub filters: Arc<ApiFilters<'a>>,
    pub havings: Arc<Havings<'a>>,
    pub having: Option<Arc<HavingExpr>>,
    pub sorts: Arc<IndexSet<OrderByColumn>>,
    pub date_time_sort: Option<OrderByColumn>,
    pub count: u32,
    pub top_n: u32,
    pub async_after: AsyncAfter,
    pub time_zone: Tz,
    pub filter_builder: Arc<dyn FilterBuilder>,
    pub having_resolver: Arc<dyn HavingResolver>,
}

/// A fully resolved data request
///
/// Never mutated after construction. Each `with_*` method returns a new
/// request that differs in one field and shares every other field with
/// `self`; the collections sit behind `Arc`, so deriving never copies them.
///
/// Deriving does not re-validate. A caller that changes a field covered by
/// a cross-field rule (sorts and topN, intervals and granularity, filters
/// and dimensions) should call [`CompiledRequest::validate`] on the result.
#[derive(Debug, Clone)]
pub struct CompiledRequest<'a> {
    parts: RequestParts<'a>,
}

macro_rules! with_fields {
    ($($(#[$doc:meta])* $with:ident => $field:ident: $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $with(&self, $field: impl Into<$ty>) -> Self {
                let mut parts = self.parts.clone();
                parts.$field = $field.into();
                Self { parts }
            }
        )*
    };
}

impl<'a> CompiledRequest<'a> {
    /// Assemble a request from resolved parts without validating them
    pub fn from_parts(parts: RequestParts<'a>) -> Self {
        Self { parts }
    }

    /// Assemble a request and check the cross-field rules
    pub fn try_from_parts(parts: RequestParts<'a>) -> Result<Self, RequestError> {
        let request = Self::from_parts(parts);
        request.validate()?;
        Ok(request)
    }

    /// A copy of the parts, sharing every collection with `self`
    pub fn to_parts(&self) -> RequestParts<'a> {
        self.parts.clone()
    }

    /// Check the cross-field rules against the current field values
    pub fn validate(&self) -> Result<(), RequestError> {
        validator::validate_request(self)
    }

    with_fields! {
        with_format => format: ResponseFormat;
        with_pagination => pagination: Option<PaginationParameters>;
        with_uri => uri: Arc<Url>;
        with_table => table: &'a LogicalTable;
        with_granularity => granularity: Granularity;
        with_dimensions => dimensions: Arc<IndexSet<&'a Dimension>>;
        with_dimension_fields => dimension_fields: Arc<DimensionFieldSelection<'a>>;
        with_metrics => metrics: Arc<IndexSet<LogicalMetric<'a>>>;
        with_intervals => intervals: Arc<IndexSet<Interval>>;
        with_filters => filters: Arc<ApiFilters<'a>>;
        with_havings => havings: Arc<Havings<'a>>;
        with_having => having: Option<Arc<HavingExpr>>;
        with_sorts => sorts: Arc<IndexSet<OrderByColumn>>;
        with_date_time_sort => date_time_sort: Option<OrderByColumn>;
        /// Row limit; 0 means unset
        with_count => count: u32;
        /// Per-bucket row limit; 0 means unset
        with_top_n => top_n: u32;
        with_async_after => async_after: AsyncAfter;
        with_time_zone => time_zone: Tz;
        with_filter_builder => filter_builder: Arc<dyn FilterBuilder>;
        with_having_resolver => having_resolver: Arc<dyn HavingResolver>;
    }

    pub fn format(&self) -> ResponseFormat {
        self.parts.format
    }

    pub fn pagination(&self) -> Option<PaginationParameters> {
        self.parts.pagination
    }

    pub fn uri(&self) -> &Url {
        &self.parts.uri
    }

    pub fn table(&self) -> &'a LogicalTable {
        self.parts.table
    }

    pub fn granularity(&self) -> &Granularity {
        &self.parts.granularity
    }

    /// Grouping dimensions in request order
    pub fn dimensions(&self) -> &Arc<IndexSet<&'a Dimension>> {
        &self.parts.dimensions
    }

    pub fn dimension_fields(&self) -> &Arc<DimensionFieldSelection<'a>> {
        &self.parts.dimension_fields
    }

    pub fn metrics(&self) -> &Arc<IndexSet<LogicalMetric<'a>>> {
        &self.parts.metrics
    }

    pub fn intervals(&self) -> &Arc<IndexSet<Interval>> {
        &self.parts.intervals
    }

    pub fn filters(&self) -> &Arc<ApiFilters<'a>> {
        &self.parts.filters
    }

    /// Dimensions referenced by at least one filter
    pub fn filter_dimensions(&self) -> impl Iterator<Item = &'a Dimension> + '_ {
        self.parts.filters.keys().copied()
    }

    pub fn havings(&self) -> &Arc<Havings<'a>> {
        &self.parts.havings
    }

    /// All havings combined into one query engine predicate
    pub fn having(&self) -> Option<&HavingExpr> {
        self.parts.having.as_deref()
    }

    /// Metric sorts, excluding the time-axis sort
    pub fn sorts(&self) -> &Arc<IndexSet<OrderByColumn>> {
        &self.parts.sorts
    }

    pub fn date_time_sort(&self) -> Option<&OrderByColumn> {
        self.parts.date_time_sort.as_ref()
    }

    /// Overall row limit, `None` when unset
    pub fn count(&self) -> Option<u32> {
        (self.parts.count > 0).then_some(self.parts.count)
    }

    /// Per-bucket row limit, `None` when unset
    pub fn top_n(&self) -> Option<u32> {
        (self.parts.top_n > 0).then_some(self.parts.top_n)
    }

    pub fn async_after(&self) -> AsyncAfter {
        self.parts.async_after
    }

    pub fn time_zone(&self) -> Tz {
        self.parts.time_zone
    }

    pub fn filter_builder(&self) -> &Arc<dyn FilterBuilder> {
        &self.parts.filter_builder
    }

    pub fn having_resolver(&self) -> &Arc<dyn HavingResolver> {
        &self.parts.having_resolver
    }
}

impl PartialEq for CompiledRequest<'_> {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (&self.parts, &other.parts);
        a.format == b.format
            && a.pagination == b.pagination
            && a.uri == b.uri
            && std::ptr::eq(a.table, b.table)
            && a.granularity == b.granularity
            && a.dimensions == b.dimensions
            && a.dimension_fields == b.dimension_fields
            && a.metrics == b.metrics
            && a.intervals == b.intervals
            && a.filters == b.filters
            && a.havings == b.havings
            && a.having == b.having
            && a.sorts == b.sorts
            && a.date_time_sort == b.date_time_sort
            && a.count == b.count
            && a.top_n == b.top_n
            && a.async_after == b.async_after
            && a.time_zone == b.time_zone
            && std::ptr::addr_eq(Arc::as_ptr(&a.filter_builder), Arc::as_ptr(&b.filter_builder))
            && std::ptr::addr_eq(Arc::as_ptr(&a.having_resolver), Arc::as_ptr(&b.having_resolver))
    }
}
