//! Summarization orchestrator.
//!
//! Calls the summarization backend with a bounded, linearly backed-off retry
//! loop. Only failures carrying a transient backend status are retried;
//! everything else, including a blank summary, propagates on the attempt
//! that produced it.

use std::sync::Arc;
use std::time::Duration;

use pagebrief_core::{
    config::OrchestratorConfig, traits::SummaryBackend, types::Payload, Error, Result,
};
use pagebrief_governance::{track_backend_attempt, AttemptOutcome};

/// Retry budget and backoff for backend calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total calls allowed, including the first.
    pub max_attempts: u32,
    /// Delay after attempt `n` is `n * backoff_unit`.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_unit,
        }
    }

    pub fn from_config(config: &OrchestratorConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.backoff_unit_ms),
        )
    }

    /// Delay to wait after the given failed attempt (counted from 1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_unit * attempt
    }
}

/// Drives one summarization through the backend.
pub struct SummarizationOrchestrator {
    backend: Arc<dyn SummaryBackend>,
    policy: RetryPolicy,
    overall_timeout: Option<Duration>,
}

impl SummarizationOrchestrator {
    pub fn new(backend: Arc<dyn SummaryBackend>, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            overall_timeout: None,
        }
    }

    /// Bound the whole retry loop, backoff included.
    pub fn with_overall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.overall_timeout = timeout;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Summarize a payload, retrying transient backend failures.
    ///
    /// Returns [`Error::ExhaustedRetries`] once `max_attempts` transient
    /// failures have been seen, and [`Error::Timeout`] if the overall
    /// deadline passes first.
    pub async fn summarize(&self, payload: &Payload) -> Result<String> {
        match self.overall_timeout {
            Some(limit) => tokio::time::timeout(limit, self.run_attempts(payload))
                .await
                .map_err(|_| {
                    Error::Timeout(format!(
                        "Summarization did not finish within {}s",
                        limit.as_secs_f64()
                    ))
                })?,
            None => self.run_attempts(payload).await,
        }
    }

    async fn run_attempts(&self, payload: &Payload) -> Result<String> {
        let kind = payload.kind();
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt: u32 = 0;

        // attempt <= max_attempts holds at the top of every iteration
        loop {
            attempt += 1;
            tracing::debug!(
                model = %self.backend.model(),
                kind = %kind,
                attempt,
                max_attempts,
                "Requesting summary"
            );

            let err = match self.backend.generate(payload).await {
                Ok(summary) if summary.trim().is_empty() => {
                    track_backend_attempt(kind, AttemptOutcome::Permanent);
                    tracing::error!(kind = %kind, attempt, "Backend returned an empty summary");
                    return Err(Error::malformed_response("Backend returned an empty summary"));
                }
                Ok(summary) => {
                    track_backend_attempt(kind, AttemptOutcome::Success);
                    tracing::info!(kind = %kind, attempts = attempt, "Summary generated");
                    return Ok(summary);
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                track_backend_attempt(kind, AttemptOutcome::Permanent);
                tracing::error!(kind = %kind, attempt, error = %err, "Backend call failed permanently");
                return Err(err);
            }

            track_backend_attempt(kind, AttemptOutcome::Transient);
            tracing::warn!(kind = %kind, attempt, max_attempts, error = %err, "Backend call failed");

            if attempt >= max_attempts {
                return Err(Error::ExhaustedRetries {
                    kind,
                    attempts: attempt,
                });
            }

            let delay = self.policy.delay_for(attempt);
            tracing::info!(delay_ms = delay.as_millis() as u64, "Retrying ({}/{})", attempt, max_attempts);
            tokio::time::sleep(delay).await;
        }
    }
}
