//! Observability for Pagebrief.
//!
//! This crate provides:
//! - Log and span output (stdout, optional JSON, optional OTLP export)
//! - Prometheus metrics for cache lookups, backend attempts and requests

pub mod metrics;
pub mod tracing_layer;

pub use metrics::{
    setup_metrics_recorder, track_backend_attempt, track_cache_lookup, track_request,
    AttemptOutcome,
};
pub use tracing_layer::{configure_tracing, shutdown_tracing};
