//! Metrics recording implementation using Prometheus.

use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_int_counter_with_registry, CounterVec, Encoder, HistogramVec, IntCounter, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

/// Trait for recording application metrics.
pub trait MetricsRecorder: Clone + Send + Sync + 'static {
    /// Records a login attempt for a role with its outcome.
    fn record_login_attempt(&self, role: &str, result: &str);

    /// Records how long a credential lookup took.
    fn record_login_duration(&self, role: &str, duration_secs: f64);

    /// Records a profile update with its outcome.
    fn record_profile_update(&self, result: &str);

    /// Records a newly opened live roster stream.
    fn record_roster_stream(&self);
}

/// Prometheus metrics collector.
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,

    // Login metrics
    login_attempts_total: CounterVec,
    login_duration_seconds: HistogramVec,

    profile_updates_total: CounterVec,
    roster_streams_total: IntCounter,
}

impl Metrics {
    /// Creates a new metrics instance with its own Prometheus registry.
    ///
    /// # Panics
    ///
    /// Only if a metric is registered twice, which the fixed set below rules out.
    pub fn new() -> Self {
        let registry = Arc::new(Registry::new());

        let login_attempts_total = register_counter_vec_with_registry!(
            Opts::new("login_attempts_total", "Total number of login attempts"),
            &["role", "result"],
            registry.clone()
        )
        .expect("Failed to register login_attempts_total");

        let login_duration_seconds = register_histogram_vec_with_registry!(
            "login_duration_seconds",
            "Credential lookup duration in seconds",
            &["role"],
            vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            registry.clone()
        )
        .expect("Failed to register login_duration_seconds");

        let profile_updates_total = register_counter_vec_with_registry!(
            Opts::new("profile_updates_total", "Total number of profile updates"),
            &["result"],
            registry.clone()
        )
        .expect("Failed to register profile_updates_total");

        let roster_streams_total = register_int_counter_with_registry!(
            Opts::new("roster_streams_total", "Live roster streams opened"),
            registry.clone()
        )
        .expect("Failed to register roster_streams_total");

        Metrics {
            registry,
            login_attempts_total,
            login_duration_seconds,
            profile_updates_total,
            roster_streams_total,
        }
    }

    /// Renders all metrics in Prometheus text format.
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder for Metrics {
    fn record_login_attempt(&self, role: &str, result: &str) {
        self.login_attempts_total
            .with_label_values(&[role, result])
            .inc();
    }

    fn record_login_duration(&self, role: &str, duration_secs: f64) {
        self.login_duration_seconds
            .with_label_values(&[role])
            .observe(duration_secs);
    }

    fn record_profile_update(&self, result: &str) {
        self.profile_updates_total
            .with_label_values(&[result])
            .inc();
    }

    fn record_roster_stream(&self) {
        self.roster_streams_total.inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_metrics() {
        let metrics = Metrics::new();
        metrics.record_login_attempt("manager", "success");
        metrics.record_login_duration("manager", 0.02);
        metrics.record_profile_update("failure");
        metrics.record_roster_stream();

        let text = metrics.render();
        let login_line = text
            .lines()
            .find(|l| l.starts_with("login_attempts_total{"))
            .unwrap();
        assert!(login_line.contains(r#"role="manager""#));
        assert!(login_line.contains(r#"result="success""#));
        assert!(login_line.ends_with(" 1"));
        assert!(text.contains("login_duration_seconds_bucket"));
        assert!(text.contains(r#"profile_updates_total{result="failure"} 1"#));
        assert!(text.contains("roster_streams_total 1"));
    }

    #[test]
    fn test_instances_do_not_share_registries() {
        let a = Metrics::new();
        let b = Metrics::new();
        a.record_roster_stream();
        assert!(!b.render().contains("roster_streams_total 1"));
    }
}
