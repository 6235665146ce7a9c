use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// In-process counters. Each increment is mirrored to the `metrics` facade
/// under the same name, so an installed recorder sees identical values.
#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    provider_fallback_total: AtomicU64,
    provider_timeout_total: AtomicU64,
    log_write_failures_total: AtomicU64,
    weather_synthetic_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub provider_fallback_total: u64,
    pub provider_timeout_total: u64,
    pub log_write_failures_total: u64,
    pub weather_synthetic_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("requests_total").increment(1);
    }

    /// A provider slot answered with a local fallback after an error.
    pub fn inc_provider_fallback(&self, provider: &'static str) {
        self.provider_fallback_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("provider_fallback_total", "provider" => provider).increment(1);
    }

    pub fn inc_provider_timeout(&self, provider: &'static str) {
        self.provider_timeout_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("provider_timeout_total", "provider" => provider).increment(1);
    }

    pub fn inc_log_write_failure(&self) {
        self.log_write_failures_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("log_write_failures_total").increment(1);
    }

    pub fn inc_weather_synthetic(&self) {
        self.weather_synthetic_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("weather_synthetic_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        let millis = duration.as_millis() as u64;
        self.total_latency_millis
            .fetch_add(millis, Ordering::Relaxed);
        metrics::counter!("chat_latency_millis_total").increment(millis);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            provider_fallback_total: self.provider_fallback_total.load(Ordering::Relaxed),
            provider_timeout_total: self.provider_timeout_total.load(Ordering::Relaxed),
            log_write_failures_total: self.log_write_failures_total.load(Ordering::Relaxed),
            weather_synthetic_total: self.weather_synthetic_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,wayfarer_api=info,wayfarer_agents=info,wayfarer_providers=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_averages_latency_over_requests() {
        let metrics = AppMetrics::default();
        assert_eq!(metrics.snapshot().avg_latency_millis, 0.0);

        metrics.inc_request();
        metrics.inc_request();
        metrics.observe_latency(Duration::from_millis(30));
        metrics.observe_latency(Duration::from_millis(10));
        metrics.inc_provider_timeout("sentiment");
        metrics.inc_provider_fallback("primary");
        metrics.inc_log_write_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 2);
        assert_eq!(snapshot.avg_latency_millis, 20.0);
        assert_eq!(snapshot.provider_timeout_total, 1);
        assert_eq!(snapshot.provider_fallback_total, 1);
        assert_eq!(snapshot.log_write_failures_total, 1);
        assert_eq!(snapshot.weather_synthetic_total, 0);
    }
}
