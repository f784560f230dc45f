//! Metrics implementation using Prometheus.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use pagebrief_core::{CacheStatus, Error, Result, SourceKind};

/// Initialize Prometheus recorder and return the handle.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::configuration(format!("Failed to install Prometheus recorder: {}", e)))?;

    tracing::info!("Prometheus metrics recorder initialized");
    Ok(handle)
}

/// How a single backend call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    Transient,
    Permanent,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Transient => "transient",
            Self::Permanent => "permanent",
        }
    }
}

/// Count a cache lookup. `None` means the read itself failed.
pub fn track_cache_lookup(status: Option<CacheStatus>) {
    let outcome = status.map(|s| s.as_str()).unwrap_or("error");
    metrics::counter!("summary_cache_lookups_total", "outcome" => outcome).increment(1);
}

/// Count one call to the summarization backend.
pub fn track_backend_attempt(kind: SourceKind, outcome: AttemptOutcome) {
    metrics::counter!(
        "summary_backend_attempts_total",
        "kind" => kind.as_str(),
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// Count a finished pipeline run and record its latency.
pub fn track_request(ok: bool, latency_sec: f64) {
    let outcome = if ok { "ok" } else { "error" };
    metrics::counter!("summary_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("summary_pipeline_duration_seconds").record(latency_sec);
}
