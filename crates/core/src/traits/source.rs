//! Content source traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// Looks up when a source was last changed, for requests that arrive
/// without their own freshness timestamp (videos).
#[async_trait]
pub trait FreshnessResolver: Send + Sync {
    /// Resolve the freshness of `source_url`, `None` if the source has none.
    async fn resolve(&self, source_url: &str) -> Result<Option<DateTime<Utc>>>;
}
