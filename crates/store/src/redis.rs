//! Redis implementation of SummaryCache.
//!
//! Each entry is a hash under `{prefix}:{fingerprint}` whose key carries an
//! `EXPIREAT` matching the stored `expires_at`, so Redis purges entries on
//! its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use ::redis::{aio::MultiplexedConnection, AsyncCommands, Client, Script};

use pagebrief_core::{
    traits::SummaryCache,
    types::{expiry_from, CacheEntry, Fingerprint},
    Error, Result,
};

const FIELD_SOURCE_URL: &str = "source_url";
const FIELD_FRESHNESS: &str = "freshness";
const FIELD_SUMMARY: &str = "summary";
const FIELD_EXPIRES_AT: &str = "expires_at";

// KEYS[1] entry key, ARGV[1] new expiry, ARGV[2] expiry field.
// The field is only written while the key is still live.
const REFRESH_EXPIRY_SCRIPT: &str = r"
if redis.call('EXPIREAT', KEYS[1], ARGV[1]) == 1 then
    redis.call('HSET', KEYS[1], ARGV[2], ARGV[1])
    return 1
end
return 0
";

/// Redis-backed summary cache.
pub struct RedisSummaryCache {
    client: Client,
    prefix: String,
    ttl: Duration,
    refresh_script: Script,
}

impl RedisSummaryCache {
    /// Create a new Redis summary cache.
    pub fn new(url: &str, prefix: &str, ttl: Duration) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| Error::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self {
            client,
            prefix: prefix.to_string(),
            ttl,
            refresh_script: Script::new(REFRESH_EXPIRY_SCRIPT),
        })
    }

    fn key(&self, fingerprint: &Fingerprint) -> String {
        format!("{}:{}", self.prefix, fingerprint)
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::cache(format!("Redis connection error: {}", e)))
    }
}

/// Rebuild an entry from its hash fields; an empty hash means absent.
fn entry_from_fields(
    fingerprint: &Fingerprint,
    mut fields: HashMap<String, String>,
) -> Result<Option<CacheEntry>> {
    if fields.is_empty() {
        return Ok(None);
    }

    let mut take = |name: &str| {
        fields
            .remove(name)
            .ok_or_else(|| Error::cache(format!("Cached entry {} is missing field '{}'", fingerprint, name)))
    };

    let source_url = take(FIELD_SOURCE_URL)?;
    let summary = take(FIELD_SUMMARY)?;
    let freshness = take(FIELD_FRESHNESS)?;
    let expires_at = take(FIELD_EXPIRES_AT)?;

    let freshness = DateTime::parse_from_rfc3339(&freshness)
        .map_err(|e| Error::cache(format!("Cached entry {} has bad freshness: {}", fingerprint, e)))?
        .with_timezone(&Utc);
    let expires_at = expires_at
        .parse::<i64>()
        .map_err(|e| Error::cache(format!("Cached entry {} has bad expiry: {}", fingerprint, e)))?;

    Ok(Some(CacheEntry {
        fingerprint: fingerprint.clone(),
        source_url,
        freshness,
        summary,
        expires_at,
    }))
}

/// Hash fields written for an entry.
fn fields_for(entry: &CacheEntry) -> [(&'static str, String); 4] {
    [
        (FIELD_SOURCE_URL, entry.source_url.clone()),
        (FIELD_FRESHNESS, entry.freshness.to_rfc3339()),
        (FIELD_SUMMARY, entry.summary.clone()),
        (FIELD_EXPIRES_AT, entry.expires_at.to_string()),
    ]
}

#[async_trait]
impl SummaryCache for RedisSummaryCache {
    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<CacheEntry>> {
        let mut conn = self.connection().await?;

        let fields: HashMap<String, String> = conn
            .hgetall(self.key(fingerprint))
            .await
            .map_err(|e| Error::cache(format!("Redis hgetall error: {}", e)))?;

        let entry = entry_from_fields(fingerprint, fields)?;
        tracing::debug!(fingerprint = %fingerprint, found = entry.is_some(), "Redis cache lookup");
        Ok(entry)
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

        let mut conn = self.connection().await?;
        let key = self.key(fingerprint);

        // Replace the whole hash so no field from an older entry survives.
        let _: () = ::redis::pipe()
            .atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &fields_for(&entry))
            .ignore()
            .expire_at(&key, entry.expires_at)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::cache(format!("Redis put error: {}", e)))?;

        tracing::debug!(
            fingerprint = %fingerprint,
            expires_at = entry.expires_at,
            "Cached summary in Redis"
        );
        Ok(())
    }

    async fn refresh_expiry(&self, fingerprint: &Fingerprint) -> Result<()> {
        let mut conn = self.connection().await?;
        let key = self.key(fingerprint);
        let expires_at = expiry_from(Utc::now(), self.ttl);

        let extended: i64 = self
            .refresh_script
            .key(&key)
            .arg(expires_at)
            .arg(FIELD_EXPIRES_AT)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| Error::cache(format!("Redis refresh error: {}", e)))?;

        if extended == 0 {
            tracing::debug!(fingerprint = %fingerprint, "No live entry to extend");
            return Ok(());
        }

        tracing::debug!(fingerprint = %fingerprint, expires_at, "Extended cache expiry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pagebrief_core::{fingerprint, DEFAULT_SUMMARY_TTL};

    fn sample_entry() -> CacheEntry {
        let freshness = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        CacheEntry::build(
            &fingerprint("https://a.example/doc"),
            "https://a.example/doc",
            Some(freshness),
            Some("# Title\n- point"),
            DEFAULT_SUMMARY_TTL,
            freshness,
        )
        .unwrap()
    }

    #[test]
    fn test_fields_rebuild_entry() {
        let entry = sample_entry();
        let fields: HashMap<String, String> = fields_for(&entry)
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        let rebuilt = entry_from_fields(&entry.fingerprint, fields).unwrap().unwrap();
        assert_eq!(rebuilt, entry);
    }

    #[test]
    fn test_empty_hash_is_absent() {
        let fp = fingerprint("u");
        assert!(entry_from_fields(&fp, HashMap::new()).unwrap().is_none());
    }

    #[test]
    fn test_partial_hash_is_cache_error() {
        let fp = fingerprint("u");
        let fields: HashMap<String, String> =
            [(FIELD_EXPIRES_AT.to_string(), "1700000000".to_string())]
                .into_iter()
                .collect();
        assert!(matches!(
            entry_from_fields(&fp, fields),
            Err(Error::CacheUnavailable(_))
        ));
    }

    #[test]
    fn test_key_layout() {
        let cache = RedisSummaryCache::new(
            "redis://127.0.0.1:6379",
            "pagebrief:summary",
            DEFAULT_SUMMARY_TTL,
        )
        .unwrap();
        let fp = fingerprint("abc");
        assert_eq!(cache.key(&fp), format!("pagebrief:summary:{}", fp));
    }

    fn live_cache() -> RedisSummaryCache {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".into());
        RedisSummaryCache::new(&url, "pagebrief:test", DEFAULT_SUMMARY_TTL).unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a running Redis (REDIS_URL)"]
    async fn test_refresh_does_not_revive_deleted_entry() {
        let cache = live_cache();
        let fp = fingerprint("https://example.com/refresh-deleted");
        cache
            .put(&fp, "https://example.com/refresh-deleted", Some(Utc::now()), Some("# S"))
            .await
            .unwrap();

        let mut conn = cache.connection().await.unwrap();
        let _: () = conn.del(cache.key(&fp)).await.unwrap();

        cache.refresh_expiry(&fp).await.unwrap();

        let exists: bool = conn.exists(cache.key(&fp)).await.unwrap();
        assert!(!exists);
        assert!(cache.get(&fp).await.unwrap().is_none());
    }

    #[tokio::test]
    #[ignore = "requires a running Redis (REDIS_URL)"]
    async fn test_refresh_extends_live_entry() {
        let cache = live_cache();
        let url = "https://example.com/refresh-live";
        let fp = fingerprint(url);
        cache.put(&fp, url, Some(Utc::now()), Some("# S")).await.unwrap();

        let mut conn = cache.connection().await.unwrap();
        let _: () = conn.expire(cache.key(&fp), 60).await.unwrap();

        cache.refresh_expiry(&fp).await.unwrap();

        let ttl: i64 = conn.ttl(cache.key(&fp)).await.unwrap();
        assert!(ttl > 60);
        let entry = cache.get(&fp).await.unwrap().unwrap();
        assert!((entry.expires_at - Utc::now().timestamp() - ttl).abs() <= 2);
        let _: () = conn.del(cache.key(&fp)).await.unwrap();
    }
}
