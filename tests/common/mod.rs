//! Shared test utilities for integration tests

use std::sync::{Arc, Once};
use chrono::{TimeZone, Utc};
use semreq::{parser, Catalog, FixedClock, PathSegment, RawRequest, RequestCompiler};
use url::Url;

static TRACING: Once = Once::new();

/// Route compiler logs to the test writer; `RUST_LOG` selects the level
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Load a test fixture from the tests/test_data directory
pub fn load_fixture(name: &str) -> Catalog {
    init_tracing();
    let path = format!("tests/test_data/{}", name);
    parser::parse_file(&path)
        .unwrap_or_else(|e| panic!("Failed to load test data {}: {}", name, e))
}

/// A compiler whose clock is fixed at 2020-03-15T12:00:00Z
pub fn compiler(catalog: &Catalog) -> RequestCompiler<'_> {
    let now = Utc.with_ymd_and_hms(2020, 3, 15, 12, 0, 0).unwrap();
    RequestCompiler::new(catalog)
        .expect("default config is valid")
        .with_clock(Arc::new(FixedClock(now)))
}

pub fn uri() -> Url {
    Url::parse("https://api.example.com/v1/data/sales/day").unwrap()
}

/// A valid daily sales request grouped by region
pub fn sales_request() -> RawRequest {
    RawRequest {
        table: "sales".into(),
        grain: "day".into(),
        dimensions: vec![PathSegment::new("region")],
        metrics: Some("revenue".into()),
        intervals: Some("2020-01-01/2020-01-02".into()),
        ..Default::default()
    }
}
