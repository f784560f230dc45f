//! In-memory summary cache implementation using DashMap.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;

use pagebrief_core::{
    traits::SummaryCache,
    types::{expiry_from, CacheEntry, Fingerprint, DEFAULT_SUMMARY_TTL},
    Result,
};

/// In-memory summary cache using DashMap for concurrent access.
///
/// Expired entries are treated as absent on read and dropped by
/// [`purge_expired`](Self::purge_expired). Contents do not outlive the
/// process, so this store is meant for development and tests.
#[derive(Debug)]
pub struct InMemorySummaryCache {
    entries: DashMap<Fingerprint, CacheEntry>,
    ttl: Duration,
}

impl InMemorySummaryCache {
    /// Create a new in-memory cache with the default 90-day TTL.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: DEFAULT_SUMMARY_TTL,
        }
    }

    /// Set the entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Get the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry whose expiry has passed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now())
    }

    /// Purge on a fixed interval until the cache is dropped.
    pub fn spawn_purge_task(self: &Arc<Self>, every: Duration) -> tokio::task::JoinHandle<()> {
        let cache = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                match cache.upgrade() {
                    Some(cache) => {
                        cache.purge_expired();
                    }
                    None => break,
                }
            }
        })
    }

    fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            tracing::debug!(purged, "Purged expired summaries");
        }
        purged
    }
}

impl Default for InMemorySummaryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SummaryCache for InMemorySummaryCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let now = Utc::now();
        let found = self.entries.get(fingerprint).map(|r| r.value().clone());

        match found {
            Some(entry) if entry.is_expired_at(now) => {
                self.entries
                    .remove_if(fingerprint, |_, e| e.is_expired_at(now));
                tracing::trace!(fingerprint = %fingerprint, "Cache entry expired");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn put(
        &self,
        fingerprint: &Fingerprint,
        source_url: &str,
        freshness: Option<DateTime<Utc>>,
        summary: Option<&str>,
    ) -> Result<()> {
        let Some(entry) =
            CacheEntry::build(fingerprint, source_url, freshness, summary, self.ttl, Utc::now())
        else {
            return Ok(());
        };

        tracing::debug!(
            fingerprint = %fingerprint,
            expires_at = entry.expires_at,
            summary_len = entry.summary.len(),
            "Caching summary in memory"
        );
        self.entries.insert(fingerprint.clone(), entry);
        Ok(())
    }

    async fn refresh_expiry(&self, fingerprint: &Fingerprint) -> Result<()> {
        let now = Utc::now();
        match self.entries.get_mut(fingerprint) {
            Some(mut entry) if !entry.is_expired_at(now) => {
                entry.expires_at = expiry_from(now, self.ttl);
                tracing::debug!(fingerprint = %fingerprint, expires_at = entry.expires_at, "Extended cache expiry");
            }
            _ => {
                tracing::debug!(fingerprint = %fingerprint, "No live entry to extend");
            }
        }
        Ok(())
    }
}
