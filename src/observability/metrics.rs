//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): total requests by method, status,
//!   route class
//! - `proxy_request_duration_seconds` (histogram): latency distribution
//! - `proxy_cache_events_total` (counter): cache hits, misses, stores
//!
//! # Design Decisions
//! - Low-overhead updates via the `metrics` facade
//! - Prometheus exposition on its own listener, off the request path

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::routing::RouteClass;

/// Install the Prometheus recorder and exposition endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics endpoint"),
    }
}

fn class_label(class: RouteClass) -> &'static str {
    match class {
        RouteClass::NormalizeSlash => "normalize",
        RouteClass::Proxy => "proxy",
        RouteClass::PassThrough => "pass_through",
    }
}

/// Record one completed request.
pub fn record_request(method: &str, status: u16, class: RouteClass, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("route", class_label(class).to_string()),
    ];
    metrics::counter!("proxy_requests_total", &labels).increment(1);
    metrics::histogram!("proxy_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record a cache event: "hit", "miss", or "store".
pub fn record_cache_event(event: &'static str) {
    metrics::counter!("proxy_cache_events_total", "event" => event).increment(1);
}
