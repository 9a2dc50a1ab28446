//! Observability module
//!
//! Structured logging helpers for matching passes and the metrics
//! collector backed by the `metrics` crate.

pub mod metrics_collector;
pub mod structured_logger;

pub use metrics_collector::{init_metrics_exporter, MetricsCollector};
pub use structured_logger::StructuredLogger;
