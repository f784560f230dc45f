//! YouTube metadata lookup.
//!
//! Videos carry no `Last-Modified` header, so their publish date stands in
//! for the freshness timestamp.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, Secret};
use url::Url;

use pagebrief_core::{
    config::YouTubeConfig, parse_freshness, traits::FreshnessResolver, BackendError, Error,
    Result,
};

use crate::types::VideoListResponse;

/// Extract the video id from a YouTube watch or short link.
///
/// `youtube.com/watch?v=<id>` (with or without `www.`/`m.`) and
/// `youtu.be/<id>` are recognised. Anything else yields `None`.
pub fn extract_video_id(video_url: &str) -> Option<String> {
    let parsed = Url::parse(video_url).ok()?;
    let host = parsed.host_str()?;

    let id = match host {
        "www.youtube.com" | "youtube.com" | "m.youtube.com" => parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned()),
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string),
        _ => None,
    };

    id.filter(|id| !id.is_empty())
}

/// Resolves a video's publish date through the YouTube Data API.
pub struct YouTubeMetadataClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Secret<String>,
}

impl YouTubeMetadataClient {
    pub fn new(base_url: impl Into<String>, api_key: Secret<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Build from the application's youtube section. The API key is required.
    pub fn from_config(config: &YouTubeConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            Error::configuration("YouTube API key not set (youtube.api_key or YOUTUBE_DATA_API_KEY)")
        })?;
        Ok(Self::new(config.base_url.clone(), api_key))
    }

    fn videos_endpoint(&self) -> String {
        format!("{}/videos", self.base_url.trim_end_matches('/'))
    }

    async fn list_video(&self, video_id: &str) -> Result<VideoListResponse> {
        let response = self
            .http
            .get(self.videos_endpoint())
            .query(&[
                ("part", "snippet,contentDetails"),
                ("id", video_id),
                ("key", self.api_key.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(|e| BackendError::transport(format!("YouTube request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::status(
                status.as_u16(),
                format!("YouTube videos.list failed: {}", body.trim()),
            )
            .into());
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::transport(format!("YouTube response unreadable: {}", e)))?;
        parse_video_list(&text)
    }
}

fn parse_video_list(body: &str) -> Result<VideoListResponse> {
    serde_json::from_str(body)
        .map_err(|e| Error::malformed_response(format!("Unreadable videos.list reply: {}", e)))
}

/// Publish date of the first listed video.
fn published_at(video_id: &str, response: VideoListResponse) -> Result<Option<DateTime<Utc>>> {
    let item = response.items.into_iter().next().ok_or_else(|| {
        Error::invalid_input(format!("No YouTube video found with ID: {}", video_id))
    })?;

    let Some(snippet) = item.snippet else {
        return Ok(None);
    };

    if let Some(title) = &snippet.title {
        tracing::debug!(video_id, title = %title, "Resolved video metadata");
    }

    snippet
        .published_at
        .as_deref()
        .map(parse_freshness)
        .transpose()
}

#[async_trait]
impl FreshnessResolver for YouTubeMetadataClient {
    async fn resolve(&self, source_url: &str) -> Result<Option<DateTime<Utc>>> {
        let video_id = extract_video_id(source_url)
            .ok_or_else(|| Error::invalid_input("Invalid YouTube URL"))?;
        tracing::debug!(video_id = %video_id, "Looking up video publish date");

        let response = self.list_video(&video_id).await?;
        published_at(&video_id, response)
    }
}
