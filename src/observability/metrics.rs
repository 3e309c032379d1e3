//! Metrics collection and exposition.
//!
//! # Metrics
//! - `zenara_requests_total` (counter): requests by method, status, route
//! - `zenara_request_duration_seconds` (histogram): latency distribution
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed, so tests and
//!   metrics-disabled deployments pay nothing
//! - Unmatched paths share the `unmatched` route label and extension methods
//!   share the `other` method label, so label cardinality stays bounded

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::Method;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Route label for requests that hit the fallback.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Method label for extension methods.
pub const OTHER_METHOD: &str = "other";

/// Metric label for `method`: the standard verbs by name, everything else
/// as [`OTHER_METHOD`].
pub fn method_label(method: &Method) -> &'static str {
    match method.as_str() {
        "GET" => "GET",
        "POST" => "POST",
        "PUT" => "PUT",
        "DELETE" => "DELETE",
        "PATCH" => "PATCH",
        "HEAD" => "HEAD",
        "OPTIONS" => "OPTIONS",
        _ => OTHER_METHOD,
    }
}

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, route: &str, start: Instant) {
    let labels = [
        ("method", method.to_owned()),
        ("status", status.to_string()),
        ("route", route.to_owned()),
    ];

    ::metrics::counter!("zenara_requests_total", &labels).increment(1);
    ::metrics::histogram!("zenara_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}
