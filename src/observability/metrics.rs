//! Metrics collection and exposition.
//!
//! # Metrics
//! - `vanity_decisions_total` (counter): decisions by outcome (`forward`, `pass_through`)
//! - `vanity_failures_total` (counter): failed requests by kind (`resolve`, `dispatch`)
//! - `vanity_resolution_duration_seconds` (histogram): time spent resolving
//! - `vanity_config_reloads_total` (counter): configuration applies
//! - `vanity_root_paths` (gauge): live rule count

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one resolution outcome.
pub fn record_decision(outcome: &'static str, start: Instant) {
    counter!("vanity_decisions_total", "outcome" => outcome).increment(1);
    histogram!("vanity_resolution_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a request failed by the resolver or the dispatcher.
pub fn record_failure(kind: &'static str) {
    counter!("vanity_failures_total", "kind" => kind).increment(1);
}

/// Record a configuration apply.
pub fn record_reload(root_paths: usize) {
    counter!("vanity_config_reloads_total").increment(1);
    gauge!("vanity_root_paths").set(root_paths as f64);
}
