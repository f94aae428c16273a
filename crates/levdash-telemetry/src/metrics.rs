//! Prometheus metrics for levdash.
//!
//! Covers:
//! - Backend requests (count and latency per endpoint)
//! - Query cache outcomes (hit/miss/stale/coalesced/disabled)
//! - Mutations (close, withdraw-all, bug report, subscribe)
//! - Wallet connection state
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. A registration failure
//! means duplicate metric names, which is a programming error that should
//! surface on first use rather than be ignored.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, CounterVec, Encoder, Gauge,
    HistogramVec, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Backend requests by endpoint and outcome (ok/not_found/server_error/network_error/malformed).
pub static API_REQUESTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "levdash_api_requests_total",
        "Total backend API requests",
        &["endpoint", "outcome"]
    )
    .unwrap()
});

/// Backend request latency in milliseconds.
pub static API_LATENCY_MS: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "levdash_api_latency_ms",
        "Backend API request latency in milliseconds",
        &["endpoint"],
        vec![5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0]
    )
    .unwrap()
});

/// Query cache lookups by query kind and result.
pub static QUERY_CACHE_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "levdash_query_cache_total",
        "Query cache lookups (hit/miss/stale/coalesced/disabled)",
        &["query", "result"]
    )
    .unwrap()
});

/// Mutations by action and outcome.
pub static MUTATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "levdash_mutations_total",
        "Total user-triggered mutations",
        &["action", "outcome"]
    )
    .unwrap()
});

/// Wallet session state (1 = connected, 0 = disconnected).
pub static WALLET_CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "levdash_wallet_connected",
        "Wallet session state (1=connected)"
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    /// Record a completed backend request.
    pub fn api_request(endpoint: &str, outcome: &str, latency_ms: f64) {
        API_REQUESTS_TOTAL
            .with_label_values(&[endpoint, outcome])
            .inc();
        API_LATENCY_MS
            .with_label_values(&[endpoint])
            .observe(latency_ms);
    }

    /// Record a query cache lookup.
    pub fn query_cache(query: &str, result: &str) {
        QUERY_CACHE_TOTAL.with_label_values(&[query, result]).inc();
    }

    /// Record a mutation outcome (ok/error/rejected/pending).
    pub fn mutation(action: &str, outcome: &str) {
        MUTATIONS_TOTAL.with_label_values(&[action, outcome]).inc();
    }

    pub fn wallet_connected() {
        WALLET_CONNECTED.set(1.0);
    }

    pub fn wallet_disconnected() {
        WALLET_CONNECTED.set(0.0);
    }

    /// Render all registered metrics in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let encoder = TextEncoder::new();
        let families = prometheus::gather();
        let mut buf = Vec::new();
        encoder
            .encode(&families, &mut buf)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_series() {
        Metrics::query_cache("position", "hit");
        Metrics::mutation("close_position", "ok");
        Metrics::api_request("dashboard", "ok", 12.0);
        Metrics::wallet_connected();

        let text = Metrics::render().unwrap();
        assert!(text.contains("levdash_query_cache_total"));
        assert!(text.contains("levdash_mutations_total"));
        assert!(text.contains("levdash_api_latency_ms"));
        assert!(text.contains("levdash_wallet_connected 1"));
    }
}
