//! Error types for Pagebrief.

use thiserror::Error;

use crate::types::SourceKind;

/// Result type alias using Pagebrief's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Backend status codes that are expected to clear up on retry
/// (rate limited, client closed, internal, unavailable, gateway timeout).
pub const TRANSIENT_STATUS_CODES: [u16; 5] = [429, 499, 500, 503, 504];

/// Failure reported by the summarization backend call site.
///
/// Carries the numeric status directly so callers never have to dig it
/// out of a message string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (status: {})", describe_status(.status))]
pub struct BackendError {
    /// HTTP-style status reported by the backend, if any.
    pub status: Option<u16>,
    /// Human-readable detail.
    pub message: String,
}

impl BackendError {
    /// A failure the backend answered with a status code.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// A failure that never produced a backend status (DNS, TLS, client timeout).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Whether this failure should be retried.
    pub fn is_transient(&self) -> bool {
        self.status
            .map(|code| TRANSIENT_STATUS_CODES.contains(&code))
            .unwrap_or(false)
    }
}

fn describe_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

fn exhausted_message(kind: &SourceKind, attempts: &u32) -> String {
    match kind {
        SourceKind::Video => format!(
            "Failed to summarize video even after {} attempts. Check if the video is too long (over 1 hour).",
            attempts
        ),
        SourceKind::Document => format!(
            "Failed to summarize web page even after {} attempts. Check if the page is too long (over 20MB).",
            attempts
        ),
    }
}

/// Core error type for Pagebrief.
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Input Errors
    // =========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("{}", exhausted_message(.kind, .attempts))]
    ExhaustedRetries { kind: SourceKind, attempts: u32 },

    // =========================================================================
    // Cache Errors
    // =========================================================================
    #[error("Cache unavailable: {0}")]
    CacheUnavailable(String),

    // =========================================================================
    // Generic Errors
    // =========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a malformed response error.
    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a cache unavailable error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::CacheUnavailable(msg.into())
    }

    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the orchestrator may retry after this error.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(e) if e.is_transient())
    }

    /// Stable error kind name reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "InvalidInput",
            Self::Backend(e) if e.is_transient() => "TransientBackendFailure",
            Self::Backend(_) | Self::MalformedResponse(_) => "PermanentBackendFailure",
            Self::ExhaustedRetries { .. } => "ExhaustedRetries",
            Self::CacheUnavailable(_) => "CacheUnavailable",
            Self::Timeout(_) => "Timeout",
            Self::Configuration(_) => "Configuration",
            Self::Serialization(_) | Self::Internal(_) => "Internal",
        }
    }
}
