//! HTTP gateway for Pagebrief.
//!
//! This crate provides the HTTP entry point for the summary pipeline,
//! including transport decoding of inbound requests and the mapping of
//! pipeline errors onto HTTP responses.

pub mod request;
pub mod response;
pub mod server;

pub use request::{decode_body, decompress_content, SummarizeBody};
pub use response::{status_for, ApiError, ErrorResponse, SummaryResponse};
pub use server::{GatewayConfig, GatewayServer};
