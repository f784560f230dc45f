use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Request Types
// =============================================================================

/// Kind of source being summarized.
///
/// The backend accepts very different input sizes for each kind, so the
/// kind also selects the prompt and the wording of retry-exhaustion errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A rendered web page.
    Document,
    /// A hosted video.
    Video,
}

impl SourceKind {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Video => "video",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content handed to the summarization backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Payload {
    /// A page rendered to PDF, base64 encoded (already decompressed).
    Document {
        /// Base64 PDF bytes.
        pdf_base64: String,
    },
    /// A video the backend fetches by reference.
    Video {
        /// Public URL of the video.
        url: String,
    },
}

impl Payload {
    /// Create a document payload.
    pub fn document(pdf_base64: impl Into<String>) -> Self {
        Self::Document {
            pdf_base64: pdf_base64.into(),
        }
    }

    /// Create a video payload.
    pub fn video(url: impl Into<String>) -> Self {
        Self::Video { url: url.into() }
    }

    /// The source kind this payload represents.
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Document { .. } => SourceKind::Document,
            Self::Video { .. } => SourceKind::Video,
        }
    }
}

/// One summarization request, owned by the pipeline for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizationRequest {
    /// Source URL, hashed verbatim into the cache key.
    pub source_url: String,
    /// When the source last changed. Only video requests may omit it.
    pub freshness: Option<DateTime<Utc>>,
    /// Content to summarize.
    pub payload: Payload,
}

impl SummarizationRequest {
    /// Create a request for a rendered page.
    pub fn document(
        source_url: impl Into<String>,
        freshness: DateTime<Utc>,
        pdf_base64: impl Into<String>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            freshness: Some(freshness),
            payload: Payload::document(pdf_base64),
        }
    }

    /// Create a request for a video; the video URL doubles as the source URL.
    pub fn video(url: impl Into<String>, freshness: Option<DateTime<Utc>>) -> Self {
        let url = url.into();
        Self {
            source_url: url.clone(),
            freshness,
            payload: Payload::video(url),
        }
    }
}

/// Where a returned summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Served from a cache entry at least as fresh as the source.
    Hit,
    /// A cache entry existed but was older than the source.
    Stale,
    /// No cache entry (or the cache could not be read).
    Miss,
}

impl CacheStatus {
    /// Label used in logs, metrics and response headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Stale => "stale",
            Self::Miss => "miss",
        }
    }
}

/// Successful pipeline outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizationResult {
    /// Summary as literal Markdown.
    pub summary_markdown: String,
    /// How the summary was obtained.
    pub cache_status: CacheStatus,
}
