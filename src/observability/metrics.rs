//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_invocations_total` (counter): invocations by entry point, status
//! - `gateway_invocation_duration_seconds` (histogram): latency by entry point
//! - `gateway_authorizer_decisions_total` (counter): decisions by effect
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

/// Record one router/describe invocation.
pub fn record_invocation(entry: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "gateway_invocations_total",
        "entry" => entry,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gateway_invocation_duration_seconds", "entry" => entry)
        .record(start.elapsed().as_secs_f64());
}

/// Record an authorizer outcome (`Allow`, `Deny` or `Unauthorized`).
pub fn record_authorizer_decision(effect: &'static str) {
    metrics::counter!("gateway_authorizer_decisions_total", "effect" => effect).increment(1);
}
