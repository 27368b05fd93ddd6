//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bridge_messages_received_total` (counter): inbound messages seen
//! - `bridge_jobs_enqueued_total` (counter): jobs admitted to the queue
//! - `bridge_jobs_completed_total` (counter): finished jobs by outcome (success, failure)
//! - `bridge_errors_reported_total` (counter): error reports by kind
//! - `bridge_http_request_duration_seconds` (histogram): outbound call latency
//! - `bridge_queue_depth` (gauge): admitted jobs waiting for a worker

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::error::ErrorKind;

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_message_received() {
    metrics::counter!("bridge_messages_received_total").increment(1);
}

pub fn record_job_enqueued() {
    metrics::counter!("bridge_jobs_enqueued_total").increment(1);
}

pub fn record_job_completed(outcome: &'static str) {
    metrics::counter!("bridge_jobs_completed_total", "outcome" => outcome).increment(1);
}

pub fn record_error(kind: ErrorKind) {
    metrics::counter!("bridge_errors_reported_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_http_call(method: &str, status: u16, start_time: Instant) {
    metrics::histogram!(
        "bridge_http_request_duration_seconds",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .record(start_time.elapsed().as_secs_f64());
}

pub fn record_queue_depth(depth: usize) {
    metrics::gauge!("bridge_queue_depth").set(depth as f64);
}
