//! Metrics and observability utilities
//!
//! Provides Prometheus metrics with standardized naming conventions.

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use std::time::Instant;

/// Metrics prefix for all CiteForge metrics
pub const METRICS_PREFIX: &str = "citeforge";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.005,  // 5ms
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
];

/// Buckets for whole analyses (dominated by provider round trips)
pub const ANALYSIS_BUCKETS: &[f64] = &[
    0.5,
    1.0,
    5.0,
    15.0,
    30.0,
    60.0,
    120.0,
    300.0,
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Provider metrics
    describe_counter!(
        format!("{}_provider_fetch_total", METRICS_PREFIX),
        Unit::Count,
        "Metadata provider lookups by outcome"
    );

    describe_histogram!(
        format!("{}_provider_fetch_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Metadata provider lookup latency in seconds"
    );

    // Analysis metrics
    describe_counter!(
        format!("{}_analyses_total", METRICS_PREFIX),
        Unit::Count,
        "Citation network analyses by outcome"
    );

    describe_histogram!(
        format!("{}_analysis_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "End-to-end analysis latency in seconds"
    );

    describe_gauge!(
        format!("{}_network_nodes", METRICS_PREFIX),
        Unit::Count,
        "Attributed nodes in the most recent network"
    );

    describe_gauge!(
        format!("{}_network_edges", METRICS_PREFIX),
        Unit::Count,
        "Edges in the most recent network"
    );

    describe_counter!(
        format!("{}_clustering_fallback_total", METRICS_PREFIX),
        Unit::Count,
        "Analyses that substituted connected components for modularity clustering"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Outcome of a single provider lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Found,
    Absent,
    Failed,
}

impl FetchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchOutcome::Found => "found",
            FetchOutcome::Absent => "absent",
            FetchOutcome::Failed => "failed",
        }
    }
}

/// Helper to record provider lookup metrics
pub fn record_fetch(duration_secs: f64, provider: &str, outcome: FetchOutcome) {
    counter!(
        format!("{}_provider_fetch_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        format!("{}_provider_fetch_duration_seconds", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .record(duration_secs);
}

/// Helper to record a completed analysis
pub fn record_analysis(duration_secs: f64, nodes: usize, edges: usize, strategy: &str) {
    counter!(
        format!("{}_analyses_total", METRICS_PREFIX),
        "outcome" => "success",
        "strategy" => strategy.to_string()
    )
    .increment(1);

    histogram!(format!("{}_analysis_duration_seconds", METRICS_PREFIX)).record(duration_secs);

    gauge!(format!("{}_network_nodes", METRICS_PREFIX)).set(nodes as f64);
    gauge!(format!("{}_network_edges", METRICS_PREFIX)).set(edges as f64);
}

/// Helper to record an analysis that produced no network
pub fn record_empty_network() {
    counter!(
        format!("{}_analyses_total", METRICS_PREFIX),
        "outcome" => "empty_network"
    )
    .increment(1);
}

/// Helper to record a clustering strategy substitution
pub fn record_clustering_fallback(preferred: &str) {
    counter!(
        format!("{}_clustering_fallback_total", METRICS_PREFIX),
        "preferred" => preferred.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_sorted() {
        for buckets in [LATENCY_BUCKETS, ANALYSIS_BUCKETS] {
            let mut prev = 0.0;
            for &bucket in buckets {
                assert!(bucket > prev);
                prev = bucket;
            }
        }
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: calls are no-ops and must not panic
        let metrics = RequestMetrics::start("POST", "/v2/citations/analyze");
        metrics.finish(200);
        record_fetch(0.01, "in_memory", FetchOutcome::Absent);
        record_analysis(1.5, 10, 12, "modularity");
        record_empty_network();
        record_clustering_fallback("modularity");
    }
}
