use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// =============================================================================
// Cache Entry Types
// =============================================================================

/// Entries live this long after their last write or cache hit.
pub const DEFAULT_SUMMARY_TTL: Duration = Duration::from_secs(90 * 24 * 60 * 60);

/// Opaque cache key derived from a source URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(pub String);

impl Fingerprint {
    /// Borrow the encoded key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted summary.
///
/// `expires_at` is always set; entries without a freshness timestamp are
/// never built (see [`CacheEntry::build`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cache key.
    pub fingerprint: Fingerprint,
    /// URL the summary was produced for.
    pub source_url: String,
    /// Source modification instant the summary reflects.
    pub freshness: DateTime<Utc>,
    /// Summary Markdown.
    pub summary: String,
    /// Expiry as Unix seconds.
    pub expires_at: i64,
}

impl CacheEntry {
    /// Build an entry for a write, or `None` when the write must be skipped.
    ///
    /// A summary without a freshness anchor could never be invalidated, and
    /// an empty summary is not worth serving, so both are dropped with a
    /// warning instead of failing the caller.
    pub fn build(
        fingerprint: &Fingerprint,
        source_url: &str,
        freshness: Option<DateTime<Utc>>,
        summary: Option<&str>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let Some(freshness) = freshness else {
            tracing::warn!(
                fingerprint = %fingerprint,
                "Freshness timestamp missing, not caching the summary"
            );
            return None;
        };
        let summary = match summary {
            Some(s) if !s.is_empty() => s,
            _ => {
                tracing::warn!(fingerprint = %fingerprint, "Summary empty, not caching it");
                return None;
            }
        };

        Some(Self {
            fingerprint: fingerprint.clone(),
            source_url: source_url.to_string(),
            freshness,
            summary: summary.to_string(),
            expires_at: expiry_from(now, ttl),
        })
    }

    /// Whether the entry has passed its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now.timestamp()
    }

    /// Whether this entry reflects a source at least as new as `freshness`.
    ///
    /// Equal timestamps count as fresh.
    pub fn is_fresh_for(&self, freshness: DateTime<Utc>) -> bool {
        self.freshness >= freshness
    }
}

/// Unix-seconds expiry `ttl` after `now`.
pub fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> i64 {
    now.timestamp() + ttl.as_secs() as i64
}
