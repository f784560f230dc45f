//! Pipeline controller.
//!
//! One request runs `CacheCheck -> {HitFresh, HitStale, Miss} -> Summarize ->
//! Persist`. Cache failures never fail a request; backend failures always do,
//! and leave the cache untouched.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use pagebrief_core::{
    fingerprint,
    traits::{FreshnessResolver, SummaryCache},
    types::{CacheEntry, CacheStatus, Fingerprint, Payload, SummarizationRequest, SummarizationResult},
    Error, Result,
};
use pagebrief_governance::{track_cache_lookup, track_request};

use crate::orchestrator::SummarizationOrchestrator;

/// Serves summaries from the cache, recomputing them when stale or missing.
pub struct PipelineController {
    pub(crate) cache: Arc<dyn SummaryCache>,
    pub(crate) orchestrator: SummarizationOrchestrator,
    pub(crate) resolver: Option<Arc<dyn FreshnessResolver>>,
}

impl PipelineController {
    /// Handle one summarization request end to end.
    pub async fn handle(&self, request: SummarizationRequest) -> Result<SummarizationResult> {
        let started = Instant::now();
        let result = self.run(request).await;
        track_request(result.is_ok(), started.elapsed().as_secs_f64());
        result
    }

    #[tracing::instrument(
        name = "summarize",
        skip_all,
        fields(source_url = %request.source_url, kind = %request.payload.kind())
    )]
    async fn run(&self, request: SummarizationRequest) -> Result<SummarizationResult> {
        if request.source_url.trim().is_empty() {
            return Err(Error::invalid_input("Source URL is required"));
        }

        let freshness = self.resolve_freshness(&request).await?;
        let key = fingerprint(&request.source_url);
        tracing::debug!(fingerprint = %key, freshness = %freshness, "Checking summary cache");

        let cache_status = match self.cache.get(&key).await {
            Ok(Some(entry)) if entry.is_fresh_for(freshness) => {
                track_cache_lookup(Some(CacheStatus::Hit));
                return Ok(self.serve_hit(&key, entry).await);
            }
            Ok(Some(entry)) => {
                tracing::info!(
                    cached = %entry.freshness,
                    requested = %freshness,
                    "Cached summary is stale"
                );
                CacheStatus::Stale
            }
            Ok(None) => CacheStatus::Miss,
            Err(e) => {
                tracing::warn!(error = %e, "Cache read failed, recomputing");
                track_cache_lookup(None);
                return self.recompute(&request, &key, freshness, CacheStatus::Miss).await;
            }
        };
        track_cache_lookup(Some(cache_status));

        self.recompute(&request, &key, freshness, cache_status).await
    }

    async fn serve_hit(&self, key: &Fingerprint, entry: CacheEntry) -> SummarizationResult {
        tracing::info!("Returning cached summary, source unchanged since it was produced");

        if let Err(e) = self.cache.refresh_expiry(key).await {
            tracing::warn!(error = %e, "Failed to extend cache expiry");
        }

        SummarizationResult {
            summary_markdown: entry.summary,
            cache_status: CacheStatus::Hit,
        }
    }

    async fn recompute(
        &self,
        request: &SummarizationRequest,
        key: &Fingerprint,
        freshness: DateTime<Utc>,
        cache_status: CacheStatus,
    ) -> Result<SummarizationResult> {
        let summary = self.orchestrator.summarize(&request.payload).await?;

        if let Err(e) = self
            .cache
            .put(key, &request.source_url, Some(freshness), Some(&summary))
            .await
        {
            tracing::warn!(error = %e, "Failed to cache summary");
        }

        Ok(SummarizationResult {
            summary_markdown: summary,
            cache_status,
        })
    }

    /// The request's own freshness, or the resolver's answer for videos.
    async fn resolve_freshness(&self, request: &SummarizationRequest) -> Result<DateTime<Utc>> {
        if let Some(freshness) = request.freshness {
            return Ok(freshness);
        }

        if let Payload::Document { .. } = request.payload {
            return Err(Error::invalid_input(
                "Freshness timestamp is required for web pages",
            ));
        }

        let resolver = self.resolver.as_ref().ok_or_else(|| {
            Error::invalid_input("Freshness timestamp missing and no metadata lookup is configured")
        })?;

        match resolver.resolve(&request.source_url).await {
            Ok(Some(freshness)) => {
                tracing::debug!(freshness = %freshness, "Resolved freshness from source metadata");
                Ok(freshness)
            }
            Ok(None) => Err(Error::invalid_input(format!(
                "Could not determine a freshness timestamp for {}",
                request.source_url
            ))),
            Err(e @ Error::InvalidInput(_)) => Err(e),
            Err(e) => Err(Error::invalid_input(format!(
                "Freshness lookup failed for {}: {}",
                request.source_url, e
            ))),
        }
    }
}
