//! Mapping pipeline outcomes onto HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use pagebrief_core::{Error, SummarizationResult};

/// Header naming where a summary came from (`hit`, `stale` or `miss`).
pub const CACHE_STATUS_HEADER: &str = "x-pagebrief-cache";

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable error kind.
    pub name: String,
    /// Human-readable message.
    pub message: String,
}

/// HTTP status for a pipeline error.
pub fn status_for(err: &Error) -> StatusCode {
    match err.kind() {
        "InvalidInput" => StatusCode::BAD_REQUEST,
        "TransientBackendFailure" | "PermanentBackendFailure" | "ExhaustedRetries" => {
            StatusCode::BAD_GATEWAY
        }
        "Timeout" => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Pipeline error on its way to the caller.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        tracing::error!(kind = self.0.kind(), status = status.as_u16(), error = %self.0, "Request failed");

        let body = ErrorResponse {
            name: self.0.kind().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Successful summary, returned as literal Markdown.
#[derive(Debug)]
pub struct SummaryResponse(pub SummarizationResult);

impl IntoResponse for SummaryResponse {
    fn into_response(self) -> Response {
        let SummarizationResult {
            summary_markdown,
            cache_status,
        } = self.0;

        (
            StatusCode::OK,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/markdown; charset=utf-8"),
                ),
                (
                    header::HeaderName::from_static(CACHE_STATUS_HEADER),
                    HeaderValue::from_static(cache_status.as_str()),
                ),
            ],
            summary_markdown,
        )
            .into_response()
    }
}
