//! Prometheus metrics for the worker.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use crate::error::{WorkerError, WorkerResult};

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_TOTAL: &str = "reelpost_runs_total";
    pub const RUN_DURATION_SECONDS: &str = "reelpost_run_duration_seconds";
    pub const UPLOADS_TOTAL: &str = "reelpost_uploads_total";
    pub const SPEECH_FALLBACKS_TOTAL: &str = "reelpost_speech_fallbacks_total";
    pub const COMPILATIONS_TOTAL: &str = "reelpost_compilations_total";
}

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> WorkerResult<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| WorkerError::config_error(format!("metrics exporter: {}", e)))?;
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}

/// Record a finished scheduled run.
pub fn record_run(outcome: &'static str, duration: Duration) {
    counter!(names::RUNS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::RUN_DURATION_SECONDS, "outcome" => outcome).record(duration.as_secs_f64());
}

/// Record one object upload.
pub fn record_upload(content_type: &str) {
    let labels = [("content_type", content_type.to_string())];
    counter!(names::UPLOADS_TOTAL, &labels).increment(1);
}

/// Record a reel rendered without narration because speech failed.
pub fn record_speech_fallback() {
    counter!(names::SPEECH_FALLBACKS_TOTAL).increment(1);
}

/// Record a combinator run.
pub fn record_compilation(mode: &'static str, outcome: &'static str) {
    counter!(names::COMPILATIONS_TOTAL, "mode" => mode, "outcome" => outcome).increment(1);
}
