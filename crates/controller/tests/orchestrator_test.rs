//! Retry behaviour of the summarization orchestrator.

use std::sync::Arc;
use std::time::Duration;

use pagebrief_controller::{RetryPolicy, SummarizationOrchestrator};
use pagebrief_core::mocks::{Reply, ScriptedBackend};
use pagebrief_core::{Error, Payload, SourceKind};
use tokio::time::Instant;

fn orchestrator(backend: Arc<ScriptedBackend>) -> SummarizationOrchestrator {
    SummarizationOrchestrator::new(backend, RetryPolicy::default())
}

fn document() -> Payload {
    Payload::document("JVBERi0xLjQ=")
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_below_budget_succeed() {
    for failures in 0..3 {
        let backend = Arc::new(ScriptedBackend::failing_then(503, failures, "# Summary"));
        let started = Instant::now();

        let summary = orchestrator(backend.clone())
            .summarize(&document())
            .await
            .unwrap();

        assert_eq!(summary, "# Summary");
        assert_eq!(backend.call_count(), failures + 1);

        // 1s + 2s + ... of linear backoff
        let expected: u64 = (1..=failures as u64).sum();
        assert_eq!(started.elapsed().as_secs(), expected);
    }
}

#[tokio::test(start_paused = true)]
async fn test_persistent_transient_failure_exhausts_budget() {
    let backend = Arc::new(ScriptedBackend::new(vec![Reply::Status(503)]));
    let started = Instant::now();

    let err = orchestrator(backend.clone())
        .summarize(&document())
        .await
        .unwrap_err();

    assert_eq!(backend.call_count(), 3);
    assert!(matches!(
        err,
        Error::ExhaustedRetries {
            kind: SourceKind::Document,
            attempts: 3
        }
    ));
    assert!(err.to_string().contains("web page even after 3 attempts"));
    // no sleep after the final attempt
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_video_message() {
    let backend = Arc::new(ScriptedBackend::new(vec![Reply::Status(429)]));
    let orchestrator =
        SummarizationOrchestrator::new(backend.clone(), RetryPolicy::new(2, Duration::from_secs(1)));

    let err = orchestrator
        .summarize(&Payload::video("https://youtu.be/abc"))
        .await
        .unwrap_err();

    assert_eq!(backend.call_count(), 2);
    assert_eq!(err.kind(), "ExhaustedRetries");
    assert!(err.to_string().contains("video is too long"));
}

#[tokio::test(start_paused = true)]
async fn test_each_transient_status_is_retried() {
    for status in [429, 499, 500, 503, 504] {
        let backend = Arc::new(ScriptedBackend::failing_then(status, 1, "ok"));
        let summary = orchestrator(backend.clone())
            .summarize(&document())
            .await
            .unwrap();
        assert_eq!(summary, "ok");
        assert_eq!(backend.call_count(), 2, "status {status}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_permanent_failure_is_not_retried() {
    for status in [400, 403, 404, 502] {
        let backend = Arc::new(ScriptedBackend::failing_then(status, 1, "never"));
        let started = Instant::now();

        let err = orchestrator(backend.clone())
            .summarize(&document())
            .await
            .unwrap_err();

        assert_eq!(backend.call_count(), 1, "status {status}");
        assert_eq!(err.kind(), "PermanentBackendFailure");
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}

#[tokio::test(start_paused = true)]
async fn test_malformed_reply_is_not_retried() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        Reply::Malformed("summary missing".into()),
        Reply::Summary("too late".into()),
    ]));

    let err = orchestrator(backend.clone())
        .summarize(&document())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)));
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_blank_summary_is_a_permanent_failure() {
    for blank in ["", "  \n\t"] {
        let backend = Arc::new(ScriptedBackend::constant(blank));

        let err = orchestrator(backend.clone())
            .summarize(&document())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::MalformedResponse(_)), "{blank:?}: {err}");
        assert_eq!(err.kind(), "PermanentBackendFailure");
        assert_eq!(backend.call_count(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_permanent_failure_after_transient_stops_the_loop() {
    let backend = Arc::new(ScriptedBackend::new(vec![
        Reply::Status(503),
        Reply::Status(404),
        Reply::Summary("unreached".into()),
    ]));

    let err = orchestrator(backend.clone())
        .summarize(&document())
        .await
        .unwrap_err();

    assert_eq!(backend.call_count(), 2);
    assert_eq!(err.kind(), "PermanentBackendFailure");
}

#[tokio::test(start_paused = true)]
async fn test_overall_timeout_bounds_the_retry_loop() {
    let backend = Arc::new(ScriptedBackend::new(vec![Reply::Status(503)]));
    let orchestrator = SummarizationOrchestrator::new(backend.clone(), RetryPolicy::new(5, Duration::from_secs(1)))
        .with_overall_timeout(Some(Duration::from_secs(2)));

    let err = orchestrator.summarize(&document()).await.unwrap_err();

    assert!(matches!(err, Error::Timeout(_)));
    // attempts at t=0s and t=1s; the next one would start at t=3s
    assert_eq!(backend.call_count(), 2);
}
