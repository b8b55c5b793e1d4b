//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define dashboard metrics (fetches, de-duplication, invalidations, mutations)
//! - Expose Prometheus-compatible metrics endpoint
//! - Track per-entity-kind and per-operation counts
//!
//! # Metrics
//! - `dashboard_ledger_requests_total` (counter): ledger calls by operation, outcome
//! - `dashboard_ledger_request_duration_seconds` (histogram): ledger call latency
//! - `dashboard_cache_fetches_total` (counter): completed fetches by kind, outcome
//! - `dashboard_cache_hits_total` (counter): reads served from a fresh entry
//! - `dashboard_cache_dedup_total` (counter): reads joined onto an in-flight fetch
//! - `dashboard_cache_invalidations_total` (counter): invalidations by kind
//! - `dashboard_mutations_total` (counter): mutations by operation, outcome
//! - `dashboard_active_polls` (gauge): running poll timers
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed
//! - Labels are static strings to keep cardinality bounded

use std::net::SocketAddr;
use std::time::Duration;

use ::metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_ledger_call(operation: &'static str, outcome: &'static str, elapsed: Duration) {
    counter!("dashboard_ledger_requests_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
    histogram!("dashboard_ledger_request_duration_seconds", "operation" => operation)
        .record(elapsed.as_secs_f64());
}

pub fn record_cache_fetch(kind: &'static str, outcome: &'static str) {
    counter!("dashboard_cache_fetches_total", "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn record_cache_hit(kind: &'static str) {
    counter!("dashboard_cache_hits_total", "kind" => kind).increment(1);
}

pub fn record_dedup(kind: &'static str) {
    counter!("dashboard_cache_dedup_total", "kind" => kind).increment(1);
}

pub fn record_invalidation(kind: &'static str) {
    counter!("dashboard_cache_invalidations_total", "kind" => kind).increment(1);
}

pub fn record_mutation(operation: &'static str, outcome: &'static str) {
    counter!("dashboard_mutations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

pub fn record_poll_started() {
    gauge!("dashboard_active_polls").increment(1.0);
}

pub fn record_poll_stopped() {
    gauge!("dashboard_active_polls").decrement(1.0);
}
