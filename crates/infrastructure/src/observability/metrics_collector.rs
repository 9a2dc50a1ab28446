//! Metrics collector for the chair matcher
//!
//! Handles are registered once against the global recorder. Without an
//! installed recorder every call is a no-op, which keeps tests free of
//! exporter setup.

use std::net::SocketAddr;

use anyhow::Result;
use metrics::{counter, histogram, Counter, Histogram};
use tracing::info;

pub struct MetricsCollector {
    passes_total: Counter,
    pass_failures_total: Counter,
    assignments_total: Counter,
    assignment_conflicts_total: Counter,
    unmatched_rides_total: Counter,
    pass_duration: Histogram,
    candidate_count: Histogram,
}

impl MetricsCollector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            passes_total: counter!("matcher_passes_total"),
            pass_failures_total: counter!("matcher_pass_failures_total"),
            assignments_total: counter!("matcher_assignments_total"),
            assignment_conflicts_total: counter!("matcher_assignment_conflicts_total"),
            unmatched_rides_total: counter!("matcher_unmatched_rides_total"),
            pass_duration: histogram!("matcher_pass_duration_seconds"),
            candidate_count: histogram!("matcher_free_candidates"),
        })
    }

    /// Record a finished pass
    pub fn record_pass(&self, duration_seconds: f64) {
        self.passes_total.increment(1);
        self.pass_duration.record(duration_seconds);
    }

    /// Record a pass aborted by an error
    pub fn record_pass_failure(&self, duration_seconds: f64) {
        self.pass_failures_total.increment(1);
        self.pass_duration.record(duration_seconds);
    }

    pub fn record_assignment(&self) {
        self.assignments_total.increment(1);
    }

    pub fn record_conflict(&self) {
        self.assignment_conflicts_total.increment(1);
    }

    pub fn record_unmatched(&self) {
        self.unmatched_rides_total.increment(1);
    }

    /// Record how many free candidates a ride saw
    pub fn record_candidates(&self, count: usize) {
        self.candidate_count.record(count as f64);
    }
}

/// Install the Prometheus exporter as the global recorder
///
/// Must be called from within a tokio runtime; the HTTP listener is spawned
/// onto it.
pub fn init_metrics_exporter(listen_address: SocketAddr) -> Result<()> {
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(listen_address)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    info!("Prometheus metrics exporter listening on {}", listen_address);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_without_recorder_is_noop() {
        let metrics = MetricsCollector::new().unwrap();
        metrics.record_pass(0.01);
        metrics.record_pass_failure(0.02);
        metrics.record_assignment();
        metrics.record_conflict();
        metrics.record_unmatched();
        metrics.record_candidates(12);
    }
}
