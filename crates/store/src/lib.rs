//! Summary cache stores for Pagebrief.
//!
//! This crate provides the persistent backends behind the
//! [`SummaryCache`](pagebrief_core::SummaryCache) contract: an in-process
//! DashMap store for development and tests, and a Redis store whose native
//! key expiry enforces the entry TTL.

pub mod memory;
pub mod redis;

use std::sync::Arc;
use std::time::Duration;

use pagebrief_core::{config::CacheConfig, traits::SummaryCache, Result};

pub use memory::InMemorySummaryCache;
pub use redis::RedisSummaryCache;

/// How often the in-memory cache drops expired entries.
const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Build the cache selected by configuration.
///
/// Redis when a URL is configured, otherwise in-memory.
pub fn cache_from_config(config: &CacheConfig) -> Result<Arc<dyn SummaryCache>> {
    let ttl = config.ttl();
    match config.redis_url.as_deref() {
        Some(url) => {
            tracing::info!(prefix = %config.key_prefix, ttl_days = config.ttl_days, "Using Redis summary cache");
            Ok(Arc::new(RedisSummaryCache::new(url, &config.key_prefix, ttl)?))
        }
        None => {
            tracing::info!(ttl_days = config.ttl_days, "Using in-memory summary cache");
            let cache = Arc::new(InMemorySummaryCache::new().with_ttl(ttl));
            if tokio::runtime::Handle::try_current().is_ok() {
                cache.spawn_purge_task(PURGE_INTERVAL);
            }
            Ok(cache)
        }
    }
}
