//! Prometheus metrics for the HTTP surface.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::{sync::OnceLock, time::Duration};
use tracing::{debug, error, info};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub mod names {
    pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
    pub const HTTP_METHODS_TOTAL: &str = "http_methods_total";
    pub const HTTP_RESPONSE_TIME_SECONDS: &str = "http_response_time_seconds";
}

/// Installs the global recorder. Returns `false` if it was already installed
/// or installation failed.
pub fn init_metrics() -> bool {
    if PROMETHEUS_HANDLE.get().is_some() {
        debug!("Prometheus metrics already initialized");
        return false;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = PROMETHEUS_HANDLE.set(handle);
            info!("Prometheus metrics initialized");
            true
        }
        Err(e) => {
            error!(error = %e, "Failed to install Prometheus recorder");
            false
        }
    }
}

/// Current metrics in Prometheus text format, `None` before [`init_metrics`].
pub fn render_metrics() -> Option<String> {
    PROMETHEUS_HANDLE.get().map(PrometheusHandle::render)
}

pub fn record_http_request(method: &str, path: &str, duration: Duration) {
    counter!(names::HTTP_REQUESTS_TOTAL, "path" => path.to_owned()).increment(1);
    counter!(names::HTTP_METHODS_TOTAL, "method" => method.to_owned()).increment(1);
    histogram!(names::HTTP_RESPONSE_TIME_SECONDS, "path" => path.to_owned())
        .record(duration.as_secs_f64());
}
