//! The compilation pipeline and its collaborators

use std::sync::Arc;
use chrono_tz::Tz;
use tracing::debug;
use url::Url;
use crate::catalog::{Catalog, DimensionCatalog, MetricCatalog, TableCatalog};
use crate::config::CompilerConfig;
use crate::error::{ParseError, RequestError};
use crate::request::{AsyncAfter, CompiledRequest, PaginationParameters, RawRequest, RequestParts, SortDirection};
use crate::resolver::{
    build_having, resolve_async_after, resolve_dimension_fields, resolve_dimensions,
    resolve_filters, resolve_format, resolve_granularity, resolve_intervals, resolve_metrics,
    resolve_sorts, resolve_time_zone, validate_dimensions_on_table, DefaultFilterBuilder,
    DefaultHavingResolver, FilterBuilder, HavingResolver,
};
use crate::time::{Clock, GranularityParser, StandardGranularityParser, SystemClock};
use crate::validator::parse_limit;

/// Compiles raw data requests against borrowed catalogs
///
/// Holds no per-request state, so one compiler can serve any number of
/// concurrent compilations.
#[derive(Debug, Clone)]
pub struct RequestCompiler<'a> {
    tables: &'a dyn TableCatalog,
    dimensions: &'a dyn DimensionCatalog,
    metrics: &'a dyn MetricCatalog,
    granularity_parser: Arc<dyn GranularityParser>,
    filter_builder: Arc<dyn FilterBuilder>,
    having_resolver: Arc<dyn HavingResolver>,
    clock: Arc<dyn Clock>,
    system_zone: Tz,
    default_async_after: AsyncAfter,
    default_sort_direction: SortDirection,
    date_time_column: String,
}

impl<'a> RequestCompiler<'a> {
    /// Compiler over one catalog with the default settings
    pub fn new(catalog: &'a Catalog) -> Result<Self, ParseError> {
        Self::from_catalogs(catalog, catalog, catalog, CompilerConfig::default())
    }

    /// Compiler over separate catalogs
    pub fn from_catalogs(
        tables: &'a dyn TableCatalog,
        dimensions: &'a dyn DimensionCatalog,
        metrics: &'a dyn MetricCatalog,
        config: CompilerConfig,
    ) -> Result<Self, ParseError> {
        Ok(Self {
            tables,
            dimensions,
            metrics,
            granularity_parser: Arc::new(StandardGranularityParser),
            filter_builder: Arc::new(DefaultFilterBuilder),
            having_resolver: Arc::new(DefaultHavingResolver),
            clock: Arc::new(SystemClock),
            system_zone: config.system_time_zone()?,
            default_async_after: config.async_after_default()?,
            default_sort_direction: config.sort_direction_default()?,
            date_time_column: config.date_time_column,
        })
    }

    pub fn with_granularity_parser(mut self, parser: Arc<dyn GranularityParser>) -> Self {
        self.granularity_parser = parser;
        self
    }

    pub fn with_filter_builder(mut self, builder: Arc<dyn FilterBuilder>) -> Self {
        self.filter_builder = builder;
        self
    }

    pub fn with_having_resolver(mut self, resolver: Arc<dyn HavingResolver>) -> Self {
        self.having_resolver = resolver;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Compile one request using the hints carried on the request itself
    ///
    /// `asyncAfter`, `perPage` and `page` are read from `raw`, and metrics
    /// resolve against the compiler's own metric catalog.
    pub fn compile(&self, raw: &RawRequest, uri: &Url) -> Result<CompiledRequest<'a>, RequestError> {
        let pagination = resolve_pagination(raw)?;
        self.compile_with(raw, raw.async_after.as_deref(), pagination, uri, self.metrics)
    }

    /// Compile one request with caller-supplied hints
    ///
    /// Stages run in dependency order and the first failing stage wins;
    /// within a stage every bad token of a kind is reported together.
    /// An absent `async_after` falls back to the configured default. `uri`
    /// is the request's own location, carried on the result. `metrics`
    /// replaces the compiler's metric catalog for this request only.
    pub fn compile_with(
        &self,
        raw: &RawRequest,
        async_after: Option<&str>,
        pagination: Option<PaginationParameters>,
        uri: &Url,
        metrics: &'a dyn MetricCatalog,
    ) -> Result<CompiledRequest<'a>, RequestError> {
        // 1. Time zone and granularity, which select the table
        let time_zone = resolve_time_zone(raw.time_zone.as_deref(), self.system_zone)?;
        let granularity = resolve_granularity(&raw.grain, time_zone, self.granularity_parser.as_ref())?;

        // 2. Table
        let table = self.tables.table(raw.table.trim(), &granularity).ok_or_else(|| {
            debug!(table = %raw.table, granularity = %granularity, "Undefined table");
            RequestError::TableUndefined {
                table: raw.table.trim().to_string(),
                granularity: granularity.to_string(),
            }
        })?;

        // 3. Grouping dimensions and the fields they show
        let dimensions = resolve_dimensions(&raw.dimensions, self.dimensions)?;
        validate_dimensions_on_table(&dimensions, table)?;
        let dimension_fields = resolve_dimension_fields(&raw.dimensions, self.dimensions)?;

        // 4. Metrics, which havings and sorts refer to
        let metrics = resolve_metrics(
            raw.metrics.as_deref(),
            metrics,
            self.dimensions,
            table,
            self.filter_builder.as_ref(),
        )?;

        // 5. Filters and havings
        let filters = resolve_filters(raw.filters.as_deref(), table, self.dimensions)?;
        let havings = self.having_resolver.resolve(raw.having.as_deref(), &metrics)?;
        let having = build_having(&havings);

        // 6. Intervals
        let intervals = resolve_intervals(raw.intervals.as_deref(), &granularity, time_zone, self.clock.now())?;

        // 7. Sorts
        let sorts = resolve_sorts(
            raw.sorts.as_deref(),
            &metrics,
            &self.date_time_column,
            self.default_sort_direction,
        )?;

        // 8. Limits, pagination and output
        let count = parse_limit(raw.count.as_deref(), "count")?;
        let top_n = parse_limit(raw.top_n.as_deref(), "topN")?;
        let pagination = check_pagination(pagination)?;
        let format = resolve_format(raw.format.as_deref())?;
        let async_after = resolve_async_after(async_after, self.default_async_after)?;

        // 9. Cross-field rules, then assemble
        let request = CompiledRequest::try_from_parts(RequestParts {
            format,
            pagination,
            uri: Arc::new(uri.clone()),
            table,
            granularity,
            dimensions: Arc::new(dimensions),
            dimension_fields: Arc::new(dimension_fields),
            metrics: Arc::new(metrics),
            intervals: Arc::new(intervals),
            filters: Arc::new(filters),
            havings: Arc::new(havings),
            having: having.map(Arc::new),
            sorts: Arc::new(sorts.sorts),
            date_time_sort: sorts.date_time_sort,
            count,
            top_n,
            async_after,
            time_zone,
            filter_builder: Arc::clone(&self.filter_builder),
            having_resolver: Arc::clone(&self.having_resolver),
        })?;

        debug!(
            table = %request.table().name,
            granularity = %request.granularity(),
            dimensions = request.dimensions().len(),
            metrics = request.metrics().len(),
            intervals = request.intervals().len(),
            filters = request.filters().len(),
            havings = request.havings().len(),
            sorts = request.sorts().len(),
            "Compiled request"
        );
        Ok(request)
    }
}

/// `perPage` turns pagination on; `page` defaults to the first page
fn resolve_pagination(raw: &RawRequest) -> Result<Option<PaginationParameters>, RequestError> {
    let per_page = parse_limit(raw.per_page.as_deref(), "perPage")?;
    let page = parse_limit(raw.page.as_deref(), "page")?;
    if per_page == 0 {
        return Ok(None);
    }
    if page == 0 && raw.page.as_deref().is_some_and(|p| !p.trim().is_empty()) {
        debug!("Page numbers start at 1");
        return Err(RequestError::IntegerInvalid {
            parameter: "page".to_string(),
            value: "0".to_string(),
        });
    }
    Ok(Some(PaginationParameters {
        per_page,
        page: page.max(1),
    }))
}

/// Pages and page sizes count from 1
fn check_pagination(pagination: Option<PaginationParameters>) -> Result<Option<PaginationParameters>, RequestError> {
    let Some(pagination) = pagination else {
        return Ok(None);
    };
    let zero = match pagination {
        PaginationParameters { per_page: 0, .. } => "perPage",
        PaginationParameters { page: 0, .. } => "page",
        _ => return Ok(Some(pagination)),
    };
    debug!(parameter = zero, "Pagination parameter is zero");
    Err(RequestError::IntegerInvalid {
        parameter: zero.to_string(),
        value: "0".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination() {
        let raw = |per_page: Option<&str>, page: Option<&str>| RawRequest {
            per_page: per_page.map(String::from),
            page: page.map(String::from),
            ..Default::default()
        };
        assert_eq!(resolve_pagination(&raw(None, Some("3"))), Ok(None));
        assert_eq!(
            resolve_pagination(&raw(Some("50"), None)),
            Ok(Some(PaginationParameters { per_page: 50, page: 1 }))
        );
        assert_eq!(
            resolve_pagination(&raw(Some("50"), Some("3"))),
            Ok(Some(PaginationParameters { per_page: 50, page: 3 }))
        );
        assert!(matches!(
            resolve_pagination(&raw(Some("50"), Some("0"))),
            Err(RequestError::IntegerInvalid { ref parameter, .. }) if parameter == "page"
        ));
    }

    #[test]
    fn test_caller_pagination() {
        let pages = |per_page, page| Some(PaginationParameters { per_page, page });
        assert_eq!(check_pagination(None), Ok(None));
        assert_eq!(check_pagination(pages(20, 2)), Ok(pages(20, 2)));
        assert!(matches!(
            check_pagination(pages(0, 2)),
            Err(RequestError::IntegerInvalid { ref parameter, .. }) if parameter == "perPage"
        ));
        assert!(matches!(
            check_pagination(pages(20, 0)),
            Err(RequestError::IntegerInvalid { ref parameter, .. }) if parameter == "page"
        ));
    }
}
