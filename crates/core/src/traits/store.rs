//! Summary cache trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{CacheEntry, Fingerprint};

/// Persistent key-value store of summaries keyed by fingerprint.
///
/// Implementations give per-key atomic reads and writes and purge entries
/// once their `expires_at` has passed. Concurrent writers to one key are
/// last-writer-wins.
#[async_trait]
pub trait SummaryCache: Send + Sync {
    /// Read an entry. Absence is a normal outcome.
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>>;

    /// Write (or overwrite) an entry with a fresh expiry.
    ///
    /// Silently skipped when `freshness` or `summary` is missing or empty.
    async fn put(
        &self,
        fingerprint: &Fingerprint,
        source_url: &str,
        freshness: Option<DateTime<Utc>>,
        summary: Option<&str>,
    ) -> Result<()>;

    /// Push the expiry of an existing entry forward, leaving its summary
    /// and freshness untouched. No-op when the entry is gone.
    async fn refresh_expiry(&self, fingerprint: &Fingerprint) -> Result<()>;
}
