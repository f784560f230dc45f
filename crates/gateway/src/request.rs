//! Inbound request decoding.
//!
//! Page content arrives as base64 of a gzip stream and the body as a whole
//! may itself be base64 encoded by the hosting proxy.

use std::io::Read;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::read::GzDecoder;
use serde::Deserialize;

use pagebrief_core::{parse_freshness, Error, Payload, Result, SummarizationRequest};

/// JSON body of `POST /v1/summarize`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeBody {
    pub web_url: Option<String>,
    pub video_url: Option<String>,
    /// Base64 of the gzip-compressed PDF rendering.
    pub content: Option<String>,
    /// `Last-Modified` of the page, in any accepted format.
    pub last_modified: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

impl SummarizeBody {
    /// Whether the body describes a video rather than a rendered page.
    pub fn is_video(&self) -> bool {
        is_blank(self.content.as_deref()) && is_blank(self.last_modified.as_deref())
    }

    /// Turn the body into a pipeline request, decompressing page content.
    pub fn into_request(self) -> Result<SummarizationRequest> {
        let is_video = self.is_video();
        let source_url = non_empty(self.web_url)
            .or_else(|| non_empty(self.video_url))
            .ok_or_else(|| Error::invalid_input("webUrl or videoUrl is required"))?;

        let freshness = non_empty(self.last_modified)
            .as_deref()
            .map(parse_freshness)
            .transpose()?;

        if is_video {
            tracing::debug!("No content and no lastModified, treating the source as a video");
            return Ok(SummarizationRequest::video(source_url, None));
        }

        let payload = match non_empty(self.content) {
            Some(content) => Payload::document(decompress_content(&content)?),
            // A timestamp without content only comes from the video path
            None => Payload::video(source_url.clone()),
        };

        Ok(SummarizationRequest {
            source_url,
            freshness,
            payload,
        })
    }
}

/// Parse the raw body, undoing a whole-body base64 transfer encoding.
pub fn decode_body(raw: &[u8], base64_encoded: bool) -> Result<SummarizeBody> {
    if base64_encoded {
        let decoded = decode_base64(raw)
            .ok_or_else(|| Error::invalid_input("Request body is not valid base64"))?;
        return serde_json::from_slice(&decoded)
            .map_err(|e| Error::invalid_input(format!("Request body is not valid JSON: {}", e)));
    }

    match serde_json::from_slice(raw) {
        Ok(body) => Ok(body),
        Err(json_err) => decode_base64(raw)
            .and_then(|decoded| serde_json::from_slice(&decoded).ok())
            .ok_or_else(|| {
                Error::invalid_input(format!("Request body is not valid JSON: {}", json_err))
            }),
    }
}

fn decode_base64(raw: &[u8]) -> Option<Vec<u8>> {
    let trimmed: Vec<u8> = raw
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD.decode(trimmed).ok()
}

/// Gunzip base64 content and return it base64 encoded again.
pub fn decompress_content(content: &str) -> Result<String> {
    let compressed = STANDARD
        .decode(content.trim())
        .map_err(|e| Error::invalid_input(format!("Content is not valid base64: {}", e)))?;

    let mut decompressed = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::invalid_input(format!("Decompression failed: {}", e)))?;

    tracing::debug!(
        compressed = compressed.len(),
        decompressed = decompressed.len(),
        "Decompressed page content"
    );
    Ok(STANDARD.encode(decompressed))
}
