//! Builder for PipelineController.

use std::sync::Arc;
use std::time::Duration;

use pagebrief_core::{
    traits::{FreshnessResolver, SummaryBackend, SummaryCache},
    Error, Result,
};

use crate::orchestrator::{RetryPolicy, SummarizationOrchestrator};
use crate::pipeline::PipelineController;

/// Builder for constructing a PipelineController.
pub struct PipelineBuilder {
    cache: Option<Arc<dyn SummaryCache>>,
    backend: Option<Arc<dyn SummaryBackend>>,
    resolver: Option<Arc<dyn FreshnessResolver>>,
    retry_policy: RetryPolicy,
    overall_timeout: Option<Duration>,
}

impl PipelineBuilder {
    /// Create a new builder with the default retry policy.
    pub fn new() -> Self {
        Self {
            cache: None,
            backend: None,
            resolver: None,
            retry_policy: RetryPolicy::default(),
            overall_timeout: None,
        }
    }

    /// Set the summary cache.
    pub fn with_cache(mut self, cache: Arc<dyn SummaryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the summarization backend.
    pub fn with_backend(mut self, backend: Arc<dyn SummaryBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the freshness resolver used for requests without a timestamp.
    pub fn with_resolver(mut self, resolver: Arc<dyn FreshnessResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_overall_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.overall_timeout = timeout;
        self
    }

    /// Build the PipelineController. Cache and backend are required.
    pub fn build(self) -> Result<PipelineController> {
        let cache = self
            .cache
            .ok_or_else(|| Error::configuration("PipelineBuilder: cache is required"))?;
        let backend = self
            .backend
            .ok_or_else(|| Error::configuration("PipelineBuilder: backend is required"))?;

        Ok(PipelineController {
            cache,
            orchestrator: SummarizationOrchestrator::new(backend, self.retry_policy)
                .with_overall_timeout(self.overall_timeout),
            resolver: self.resolver,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
