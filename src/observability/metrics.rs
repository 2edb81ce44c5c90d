//! Metrics collection and exposition.
//!
//! # Metrics
//! - `sendpack_attempts_total` (counter): attempts by result
//! - `sendpack_outcomes_total` (counter): finished sends by result and status
//! - `sendpack_send_duration_seconds` (histogram): wall-clock time per send
//! - `sendpack_backoff_seconds` (histogram): waits inserted between attempts
//!
//! Without an installed recorder every call is a no-op.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

use crate::outcome::SendOutcome;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one attempt. `result` is `success`, `retryable`, `terminal`,
/// `timeout` or `transport`.
pub fn record_attempt(result: &'static str) {
    counter!("sendpack_attempts_total", "result" => result).increment(1);
}

pub fn record_backoff(delay: Duration) {
    histogram!("sendpack_backoff_seconds").record(delay.as_secs_f64());
}

/// Record a finished send.
pub fn record_outcome(outcome: &SendOutcome) {
    let result = if outcome.success { "success" } else { "failure" };
    counter!(
        "sendpack_outcomes_total",
        "result" => result,
        "status" => outcome.status.to_string()
    )
    .increment(1);
    histogram!("sendpack_send_duration_seconds").record(outcome.elapsed.as_secs_f64());
}

/// Record a packet rejected before any I/O.
pub fn record_rejected() {
    counter!("sendpack_outcomes_total", "result" => "rejected", "status" => "0").increment(1);
}
