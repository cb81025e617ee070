//! Metrics collection and exposition.
//!
//! # Metrics
//! - `diagnoskit_http_requests_total` (counter): request attempts
//! - `diagnoskit_http_failures_total` (counter): failed requests (status >= 400 or fault)
//! - `diagnoskit_http_requests_by_endpoint_total` (counter): by `endpoint`, `status_code`
//!
//! # Design Decisions
//! - `MetricsRecorder` is passed explicitly to the pipeline, never a global
//! - Exact in-process totals (atomics + `DashMap`) so callers can read them back
//! - Every increment is mirrored to the `metrics` facade for Prometheus export

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use metrics::{counter, describe_counter, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const HTTP_REQUESTS_TOTAL: &str = "diagnoskit_http_requests_total";
pub const HTTP_FAILURES_TOTAL: &str = "diagnoskit_http_failures_total";
pub const HTTP_REQUESTS_BY_ENDPOINT_TOTAL: &str = "diagnoskit_http_requests_by_endpoint_total";

/// Endpoint tag used for the entry recorded when a handler faults.
pub const EXCEPTION_ENDPOINT: &str = "exception";

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_counter!(HTTP_REQUESTS_TOTAL, Unit::Count, "Total HTTP requests handled");
    describe_counter!(HTTP_FAILURES_TOTAL, Unit::Count, "Failed HTTP requests");
    describe_counter!(
        HTTP_REQUESTS_BY_ENDPOINT_TOTAL,
        Unit::Count,
        "Number of requests grouped by endpoint"
    );

    tracing::info!(address = %addr, "Prometheus metrics exporter started");
    Ok(())
}

/// Key of the per-endpoint counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub endpoint: String,
    pub status_code: u16,
}

/// Process-wide request counters, shared by all in-flight requests.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    requests_total: AtomicU64,
    failures_total: AtomicU64,
    by_endpoint: DashMap<EndpointKey, u64>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub failures_total: u64,
    pub by_endpoint: Vec<(EndpointKey, u64)>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request attempt and its endpoint/status entry.
    pub fn record_request(&self, endpoint: &str, status_code: u16) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        counter!(HTTP_REQUESTS_TOTAL).increment(1);
        self.record_endpoint(endpoint, status_code);
    }

    /// Increment only the per-endpoint counter.
    pub fn record_endpoint(&self, endpoint: &str, status_code: u16) {
        *self
            .by_endpoint
            .entry(EndpointKey {
                endpoint: endpoint.to_string(),
                status_code,
            })
            .or_insert(0) += 1;

        counter!(
            HTTP_REQUESTS_BY_ENDPOINT_TOTAL,
            "endpoint" => endpoint.to_string(),
            "status_code" => status_code.to_string()
        )
        .increment(1);
    }

    pub fn record_failure(&self) {
        self.failures_total.fetch_add(1, Ordering::Relaxed);
        counter!(HTTP_FAILURES_TOTAL).increment(1);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.load(Ordering::Relaxed)
    }

    pub fn failures_total(&self) -> u64 {
        self.failures_total.load(Ordering::Relaxed)
    }

    pub fn endpoint_count(&self, endpoint: &str, status_code: u16) -> u64 {
        self.by_endpoint
            .get(&EndpointKey {
                endpoint: endpoint.to_string(),
                status_code,
            })
            .map(|entry| *entry.value())
            .unwrap_or(0)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut by_endpoint: Vec<_> = self
            .by_endpoint
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        by_endpoint.sort_by(|(a, _), (b, _)| {
            a.endpoint
                .cmp(&b.endpoint)
                .then(a.status_code.cmp(&b.status_code))
        });

        MetricsSnapshot {
            requests_total: self.requests_total(),
            failures_total: self.failures_total(),
            by_endpoint,
        }
    }
}
