//! semreq - Compile raw data API requests into validated, immutable requests
//!
//! This library provides:
//! - Catalog types (Dimension, Metric, LogicalTable) and lookup traits
//! - Catalog and configuration parsing from YAML
//! - Per-parameter resolution with accumulate-then-report errors
//! - Cross-field validation
//! - An immutable compiled request with cheap field-level derivation
//!
//! # Architecture
//!
//! **Noun modules** (data structures):
//! - `catalog/` - dictionaries requests resolve against (Catalog, Dimension, Metric, LogicalTable)
//! - `request/` - raw request, resolved components and CompiledRequest
//! - `time/` - granularities, intervals, periods and the clock
//!
//! **Verb modules** (transformations):
//! - `parser/` - YAML → Catalog
//! - `tokens/` - parameter string → tokens
//! - `resolver/` - tokens + Catalog → resolved components
//! - `validator/` - resolved components → cross-field checks
//! - `compiler/` - RawRequest → CompiledRequest
//!
//! # Example
//!
//! ```ignore
//! use semreq::{parser, PathSegment, RawRequest, RequestCompiler};
//!
//! let catalog = parser::parse_file("catalog.yaml")?;
//! let compiler = RequestCompiler::new(&catalog)?;
//! let raw = RawRequest {
//!     table: "sales".into(),
//!     grain: "day".into(),
//!     dimensions: vec![PathSegment::new("region")],
//!     metrics: Some("revenue".into()),
//!     intervals: Some("2020-01-01/2020-01-02".into()),
//!     ..Default::default()
//! };
//! let request = compiler.compile(&raw, &"https://api.example.com/data".parse()?)?;
//! let limited = request.with_count(10u32);
//! ```

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod error;
pub mod parser;
pub mod request;
pub mod resolver;
pub mod time;
pub mod tokens;
pub mod validator;

// Re-export commonly used types
pub use catalog::{Catalog, Dimension, DimensionCatalog, DimensionField, LogicalTable, Metric, MetricCatalog, TableCatalog};
pub use compiler::RequestCompiler;
pub use config::CompilerConfig;
pub use error::{ErrorKind, ParseError, RequestError};
pub use request::{
    ApiFilter, ApiHaving, AsyncAfter, CompiledRequest, FilterExpr, HavingExpr, LogicalMetric,
    OrderByColumn, PaginationParameters, PathSegment, RawRequest, RequestParts, ResponseFormat,
    SortDirection,
};
pub use resolver::{DefaultFilterBuilder, DefaultHavingResolver, FilterBuilder, HavingResolver};
pub use time::{Clock, FixedClock, Granularity, Interval, SystemClock, TimeGrain};
