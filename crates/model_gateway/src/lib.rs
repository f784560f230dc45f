//! Model gateway for Pagebrief.
//!
//! This crate provides:
//! - The Gemini `generateContent` client behind [`SummaryBackend`](pagebrief_core::SummaryBackend)
//! - The summarization prompts and the structured response contract
//! - YouTube metadata lookup for video freshness

pub mod gemini;
pub mod prompts;
pub mod types;
pub mod youtube;

pub use gemini::{GeminiClient, GeminiConfig};
pub use youtube::{extract_video_id, YouTubeMetadataClient};
