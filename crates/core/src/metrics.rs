//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Recommendation aggregation (sections produced, swallowed failures, duration)
//! - Type-ahead search (outcomes, stale results discarded)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// =============================================================================
// Recommendations
// =============================================================================

/// Units dropped from an aggregation, by category and failing collaborator.
pub static PIPELINE_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "sceneit_pipeline_failures_total",
            "Recommendation units skipped because a fetch failed",
        ),
        &["category", "source"], // source: "signals", "catalog"
    )
    .unwrap()
});

/// Sections produced, by category.
pub static SECTIONS_PRODUCED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "sceneit_sections_produced_total",
            "Recommendation sections produced",
        ),
        &["category"],
    )
    .unwrap()
});

/// Wall time of a full aggregation run.
pub static AGGREGATION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "sceneit_aggregation_duration_seconds",
            "Duration of a recommendation aggregation run",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["audience"], // "anonymous", "personalized"
    )
    .unwrap()
});

// =============================================================================
// Search
// =============================================================================

/// Searches whose result reached the user, by outcome.
pub static SEARCH_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("sceneit_search_requests_total", "Completed searches"),
        &["outcome"], // "success", "empty", "error"
    )
    .unwrap()
});

/// Results that arrived after a newer search superseded them.
pub static SEARCH_DISCARDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "sceneit_search_discarded_total",
        "Search results discarded as stale",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PIPELINE_FAILURES.clone()),
        Box::new(SECTIONS_PRODUCED.clone()),
        Box::new(AGGREGATION_DURATION.clone()),
        Box::new(SEARCH_REQUESTS.clone()),
        Box::new(SEARCH_DISCARDED.clone()),
    ]
}

/// Register every core metric with `registry`.
pub fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    for collector in all_metrics() {
        registry.register(collector)?;
    }
    Ok(())
}
