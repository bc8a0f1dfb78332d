//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by method, status
//! - `gateway_request_duration_seconds` (histogram): latency distribution
//! - `gateway_relay_attempts_total` (counter): relay attempts by endpoint, outcome
//! - `gateway_failovers_total` (counter): endpoint rotations
//! - `gateway_endpoint_healthy` (gauge): 1=healthy, 0=unhealthy per endpoint

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed gateway request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record one relay attempt against a pooled endpoint.
pub fn record_relay_attempt(endpoint: &str, success: bool) {
    counter!(
        "gateway_relay_attempts_total",
        "endpoint" => endpoint.to_string(),
        "outcome" => if success { "success" } else { "failure" }
    )
    .increment(1);
}

/// Record an endpoint rotation.
pub fn record_failover() {
    counter!("gateway_failovers_total").increment(1);
}

/// Record the probed health of an endpoint.
pub fn record_endpoint_health(endpoint: &str, healthy: bool) {
    gauge!("gateway_endpoint_healthy", "endpoint" => endpoint.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
