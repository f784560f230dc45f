//! Summarization backend trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Payload;

/// Generative model that turns a payload into a Markdown summary.
///
/// One call is one backend round trip; retries belong to the caller.
/// Failures the backend reports carry their status through
/// [`crate::Error::Backend`]; replies that cannot be decoded into the
/// single `summary` field come back as [`crate::Error::MalformedResponse`].
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    /// Produce a summary for the payload.
    async fn generate(&self, payload: &Payload) -> Result<String>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}
