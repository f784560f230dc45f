//! Integration tests for the metrics helpers.

use metrics_exporter_prometheus::PrometheusBuilder;
use pagebrief_core::{CacheStatus, SourceKind};
use pagebrief_governance::{
    track_backend_attempt, track_cache_lookup, track_request, AttemptOutcome,
};

#[test]
fn test_metrics_are_labelled() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::with_local_recorder(&recorder, || {
        track_cache_lookup(Some(CacheStatus::Hit));
        track_cache_lookup(Some(CacheStatus::Stale));
        track_cache_lookup(None);
        track_backend_attempt(SourceKind::Video, AttemptOutcome::Transient);
        track_backend_attempt(SourceKind::Video, AttemptOutcome::Transient);
        track_request(true, 0.25);
    });

    let rendered = handle.render();
    assert!(rendered.contains(r#"summary_cache_lookups_total{outcome="hit"} 1"#));
    assert!(rendered.contains(r#"summary_cache_lookups_total{outcome="stale"} 1"#));
    assert!(rendered.contains(r#"summary_cache_lookups_total{outcome="error"} 1"#));
    assert!(rendered.contains(
        r#"summary_backend_attempts_total{kind="video",outcome="transient"} 2"#
    ));
    assert!(rendered.contains(r#"summary_requests_total{outcome="ok"} 1"#));
    assert!(rendered.contains("summary_pipeline_duration_seconds"));
}
