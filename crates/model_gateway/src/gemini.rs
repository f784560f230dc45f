//! Gemini `generateContent` client.
//!
//! Requests a JSON reply constrained to a single `summary` string field.
//! Failures are reported as [`BackendError`]s carrying the HTTP status.

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde_json::json;
use std::time::Duration;

use pagebrief_core::{
    config::BackendConfig,
    traits::SummaryBackend,
    types::{Payload, SourceKind},
    BackendError, Error, Result,
};

use crate::prompts::{prompt_for, SUMMARY_FIELD_DESCRIPTION};
use crate::types::{
    ApiErrorEnvelope, Blob, Content, FileData, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part, SummaryEnvelope,
};

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Model name, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// API root, without a trailing `/models`.
    pub base_url: String,
    /// API key.
    pub api_key: Secret<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl GeminiConfig {
    /// Create config with default endpoint and sampling settings.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        let defaults = BackendConfig::default();
        Self {
            model: model.into(),
            base_url: defaults.base_url,
            api_key: Secret::new(api_key.into()),
            temperature: defaults.temperature,
            request_timeout: Duration::from_secs(defaults.request_timeout_secs),
        }
    }

    /// Build from the application's backend section. The API key is required.
    pub fn from_backend_config(config: &BackendConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::configuration("Gemini API key not set (backend.api_key or GEMINI_API_KEY)"))?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            api_key,
            temperature: config.temperature,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// Set the API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Gemini-backed summarization client.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Build the request body for a payload.
    fn build_request(&self, payload: &Payload) -> GenerateContentRequest {
        let prompt = Part::Text(prompt_for(payload.kind()).to_string());

        let parts = match payload {
            Payload::Video { url } => vec![
                Part::FileData(FileData {
                    file_uri: url.clone(),
                }),
                prompt,
            ],
            Payload::Document { pdf_base64 } => vec![
                prompt,
                Part::InlineData(Blob {
                    mime_type: "application/pdf".to_string(),
                    data: pdf_base64.clone(),
                }),
            ],
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }
}

/// Schema constraining the reply to `{ "summary": string }`.
pub fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": SUMMARY_FIELD_DESCRIPTION,
                "nullable": false
            }
        },
        "required": ["summary"]
    })
}

/// Pull the summary out of a successful reply body.
///
/// Anything short of a non-empty `summary` string is a malformed reply.
pub fn parse_summary(body: &str) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| Error::malformed_response(format!("Unreadable generateContent reply: {}", e)))?;

    if let Some(usage) = &response.usage_metadata {
        tracing::debug!(
            prompt_tokens = ?usage.prompt_token_count,
            candidate_tokens = ?usage.candidates_token_count,
            total_tokens = ?usage.total_token_count,
            "Token usage"
        );
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| Error::malformed_response("Reply contained no candidates"))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::malformed_response(format!(
            "Reply contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    let envelope: SummaryEnvelope = serde_json::from_str(&text)
        .map_err(|e| Error::malformed_response(format!("Reply is not a summary object: {}", e)))?;

    match envelope.summary {
        Some(summary) if !summary.trim().is_empty() => Ok(summary),
        _ => Err(Error::malformed_response("Reply has an empty summary")),
    }
}

/// Map a non-success reply to a backend error.
fn error_from_status(status: u16, body: &str) -> BackendError {
    let message = match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(kind) => format!("{}: {}", kind, envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty error body".to_string(),
        Err(_) => body.trim().to_string(),
    };
    BackendError::status(status, message)
}

/// Map a failed send to a backend error.
fn error_from_transport(e: reqwest::Error) -> BackendError {
    match e.status() {
        Some(status) => BackendError::status(status.as_u16(), e.to_string()),
        None if e.is_timeout() => BackendError::transport(format!("Request timed out: {}", e)),
        None => BackendError::transport(format!("Request failed: {}", e)),
    }
}

#[async_trait]
impl SummaryBackend for GeminiClient {
    async fn generate(&self, payload: &Payload) -> Result<String> {
        let kind: SourceKind = payload.kind();
        tracing::debug!(model = %self.config.model, kind = %kind, "Calling generateContent");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.config.api_key.expose_secret())
            .json(&self.build_request(payload))
            .send()
            .await
            .map_err(error_from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(error_from_transport)?;

        if !status.is_success() {
            let err = error_from_status(status.as_u16(), &body);
            tracing::debug!(status = status.as_u16(), error = %err, "generateContent failed");
            return Err(err.into());
        }

        parse_summary(&body)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(GeminiConfig::new("test-key", "gemini-2.0-flash")).unwrap()
    }

    fn reply_with_text(text: &str) -> String {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 5, "totalTokenCount": 15 }
        })
        .to_string()
    }

    #[test]
    fn test_config_builder() {
        let config = GeminiConfig::new("k", "gemini-1.5-pro")
            .with_base_url("http://localhost:8080/v1beta/")
            .with_temperature(0.1)
            .with_request_timeout(Duration::from_secs(5));

        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.temperature, 0.1);
        let client = GeminiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = GeminiConfig::from_backend_config(&BackendConfig::default()).unwrap_err();
        assert_eq!(err.kind(), "Configuration");
    }

    #[test]
    fn test_document_request_shape() {
        let body = serde_json::to_value(client().build_request(&Payload::document("UERG"))).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert!(parts[0]["text"].as_str().unwrap().contains("web page"));
        assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[1]["inlineData"]["data"], "UERG");

        let generation = &body["generationConfig"];
        assert_eq!(generation["responseMimeType"], "application/json");
        assert_eq!(generation["responseSchema"]["required"][0], "summary");
        assert_eq!(generation["responseSchema"]["properties"]["summary"]["type"], "STRING");
    }

    #[test]
    fn test_video_request_shape() {
        let url = "https://www.youtube.com/watch?v=abc123";
        let body = serde_json::to_value(client().build_request(&Payload::video(url))).unwrap();

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["fileData"]["fileUri"], url);
        assert!(parts[1]["text"].as_str().unwrap().contains("video"));
    }

    #[test]
    fn test_parse_summary() {
        let body = reply_with_text(r##"{"summary": "# Title\n- **point**"}"##);
        assert_eq!(parse_summary(&body).unwrap(), "# Title\n- **point**");
    }

    #[test]
    fn test_parse_summary_rejects_malformed_replies() {
        let cases = [
            "not json".to_string(),
            json!({ "candidates": [] }).to_string(),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }).to_string(),
            reply_with_text("plain markdown, not an object"),
            reply_with_text(r#"{"other": "field"}"#),
            reply_with_text(r#"{"summary": ""}"#),
            reply_with_text(r#"{"summary": null}"#),
        ];

        for body in cases {
            let err = parse_summary(&body).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)), "{body}: {err}");
            assert!(!err.is_transient());
        }
    }

    #[test]
    fn test_error_from_status() {
        let body = json!({
            "error": { "code": 503, "message": "The model is overloaded.", "status": "UNAVAILABLE" }
        })
        .to_string();
        let err = error_from_status(503, &body);
        assert_eq!(err.status, Some(503));
        assert_eq!(err.message, "UNAVAILABLE: The model is overloaded.");
        assert!(err.is_transient());

        let err = error_from_status(400, "bad request");
        assert_eq!(err.message, "bad request");
        assert!(!err.is_transient());
    }
}
