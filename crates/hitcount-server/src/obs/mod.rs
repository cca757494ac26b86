//! Lightweight in-process metrics.
//!
//! Prometheus-compatible counters and histograms stored as atomics and
//! rendered by the `/metrics` handler. `ServerMetrics` also listens to the
//! counter service's retry decisions.

pub mod metrics;

pub use metrics::ServerMetrics;
