//! Metrics collection and exposition for Prometheus.
//!
//! Login attempts, profile updates and live roster streams are counted here
//! and rendered by the `/metrics` route.

mod recorder;

pub use recorder::{Metrics, MetricsRecorder};
