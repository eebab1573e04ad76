//! Metrics collection and exposition.
//!
//! # Metrics
//! - `client_info_requests_total` (counter): submissions by HTTP status
//! - `client_info_request_duration_seconds` (histogram): handler latency
//! - `geolocation_lookups_total` (counter): lookups by outcome
//! - `public_ip_discovery_total` (counter): discoveries by outcome
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a handled client-info submission.
pub fn record_request(status: u16, start: Instant) {
    record_request_status(status);
    histogram!("client_info_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Count a response the handler never returned itself (panic, limit, timeout).
pub fn record_request_status(status: u16) {
    counter!("client_info_requests_total", "status" => status.to_string()).increment(1);
}

/// Record the outcome of a geolocation lookup.
pub fn record_lookup(outcome: &'static str) {
    counter!("geolocation_lookups_total", "outcome" => outcome).increment(1);
}

/// Record the outcome of a public-IP discovery.
pub fn record_discovery(outcome: &'static str) {
    counter!("public_ip_discovery_total", "outcome" => outcome).increment(1);
}
