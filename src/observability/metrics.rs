//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_cors_blocked_total` (counter): requests rejected by the origin guard
//! - `gateway_version_rejected_total` (counter): requests rejected by the version gate
//! - `gateway_operator_keys_stripped_total` (counter): `$`/dotted keys removed from bodies
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let status = status.to_string();
    counter!("gateway_requests_total", "method" => method.to_string(), "status" => status.clone())
        .increment(1);
    histogram!("gateway_request_duration_seconds", "method" => method.to_string(), "status" => status)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cors_blocked() {
    counter!("gateway_cors_blocked_total").increment(1);
}

pub fn record_version_rejected(reason: &'static str) {
    counter!("gateway_version_rejected_total", "reason" => reason).increment(1);
}

pub fn record_operator_keys_stripped(count: usize) {
    counter!("gateway_operator_keys_stripped_total").increment(count as u64);
}
