//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - TVMaze API calls (counts by outcome, latency)
//! - Catalog cache behaviour (detail and search cache hits/misses)
//! - Catalog index size

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// TVMaze API Metrics
// =============================================================================

/// TVMaze requests by endpoint and outcome.
pub static TVMAZE_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("popcorn_tvmaze_requests_total", "Total TVMaze API requests"),
        &["endpoint", "result"], // result: "ok", "error", "cancelled"
    )
    .unwrap()
});

/// TVMaze request latency in seconds.
pub static TVMAZE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "popcorn_tvmaze_request_duration_seconds",
            "Duration of TVMaze API requests",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog cache lookups by cache and result.
pub static CATALOG_CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "popcorn_catalog_cache_lookups_total",
            "Catalog cache lookups",
        ),
        &["cache", "result"], // cache: "detail", "search"; result: "hit", "miss"
    )
    .unwrap()
});

/// Number of shows in the canonical index.
pub static CATALOG_INDEX_SIZE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "popcorn_catalog_index_size",
        "Number of shows held in the catalog index",
    )
    .unwrap()
});

/// All core metrics, for registration in the server registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TVMAZE_REQUESTS_TOTAL.clone()),
        Box::new(TVMAZE_REQUEST_DURATION.clone()),
        Box::new(CATALOG_CACHE_LOOKUPS.clone()),
        Box::new(CATALOG_INDEX_SIZE.clone()),
    ]
}
