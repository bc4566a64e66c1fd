//! Metrics collection and exposition.
//!
//! # Metrics
//! - `siteguard_requests_total` (counter): admitted requests by status class
//! - `siteguard_blocked_total` (counter): requests refused, by reason
//! - `siteguard_rate_limited_total` (counter): denials, by limiter scope
//! - `siteguard_suspicious_total` (counter): pattern-scan hits
//! - `siteguard_form_submissions_total` (counter): accepted submissions
//!
//! # Design Decisions
//! - `metrics` facade throughout; the Prometheus exporter is optional and
//!   runs on its own listener, gated by config

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus exporter on `addr`. Failure is logged, not fatal.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "failed to install metrics exporter"),
    }
}

pub fn record_request(status: u16) {
    metrics::counter!("siteguard_requests_total", "status" => status.to_string()).increment(1);
}

pub fn record_blocked(reason: &'static str) {
    metrics::counter!("siteguard_blocked_total", "reason" => reason).increment(1);
}

pub fn record_rate_limited(scope: &'static str) {
    metrics::counter!("siteguard_rate_limited_total", "scope" => scope).increment(1);
}

pub fn record_suspicious() {
    metrics::counter!("siteguard_suspicious_total").increment(1);
}

pub fn record_form_submission() {
    metrics::counter!("siteguard_form_submissions_total").increment(1);
}
