//! Metrics collection and exposition.
//!
//! # Metrics
//! - `serverless_init_attempts_total` (counter): initialization attempts by outcome
//! - `serverless_init_duration_seconds` (histogram): time spent initializing
//! - `serverless_requests_total` (counter): invocations by outcome
//!   (`delegated`, `unavailable`)
//!
//! Without an installed recorder every call is a no-op, which is the normal
//! case for the serverless entry.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder with an HTTP scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_init(outcome: &'static str, started: Instant) {
    metrics::counter!("serverless_init_attempts_total", "outcome" => outcome).increment(1);
    metrics::histogram!("serverless_init_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_request(outcome: &'static str) {
    metrics::counter!("serverless_requests_total", "outcome" => outcome).increment(1);
}
