//! Subscriber installation with OTLP export enabled.
//!
//! Kept in its own test binary since it installs the global subscriber.

use pagebrief_governance::{configure_tracing, shutdown_tracing};

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_configure_tracing_with_otlp_endpoint() {
    // The tonic channel connects lazily, so no collector needs to be listening
    std::env::set_var("OTEL_EXPORTER_OTLP_ENDPOINT", "http://127.0.0.1:4317");

    configure_tracing(true).expect("first install succeeds");
    tracing::info!("span export configured");

    std::env::remove_var("OTEL_EXPORTER_OTLP_ENDPOINT");
    let err = configure_tracing(false).unwrap_err();
    assert_eq!(err.kind(), "Configuration");

    shutdown_tracing();
}
