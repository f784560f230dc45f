//! Pagebrief - cached web page and video summaries.
//!
//! Serves Markdown summaries of rendered pages and YouTube videos, reusing a
//! cached summary for as long as its source has not changed.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use pagebrief_controller::{PipelineBuilder, RetryPolicy};
use pagebrief_core::config::AppConfig;
use pagebrief_gateway::{GatewayConfig, GatewayServer};
use pagebrief_model_gateway::{GeminiClient, GeminiConfig, YouTubeMetadataClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;

    pagebrief_governance::configure_tracing(config.telemetry.json_logs)?;

    tracing::info!("Starting Pagebrief v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Summary cache
    // =========================================================================
    let cache = pagebrief_store::cache_from_config(&config.cache)?;

    // =========================================================================
    // Summarization backend and freshness lookup
    // =========================================================================
    let backend = Arc::new(GeminiClient::new(GeminiConfig::from_backend_config(
        &config.backend,
    )?)?);
    tracing::info!(model = %config.backend.model, "Gemini backend configured");

    let mut builder = PipelineBuilder::new()
        .with_cache(cache)
        .with_backend(backend)
        .with_retry_policy(RetryPolicy::from_config(&config.orchestrator))
        .with_overall_timeout(
            config
                .orchestrator
                .overall_timeout_secs
                .map(Duration::from_secs),
        );

    if config.youtube.api_key.is_some() {
        builder = builder.with_resolver(Arc::new(YouTubeMetadataClient::from_config(
            &config.youtube,
        )?));
    } else {
        tracing::warn!("No YouTube API key, video requests without lastModified will be rejected");
    }

    let pipeline = Arc::new(builder.build()?);

    // =========================================================================
    // Gateway
    // =========================================================================
    let metrics_handle = pagebrief_governance::setup_metrics_recorder()?;
    let gateway_config = GatewayConfig::from(&config.server);

    println!();
    println!("Pagebrief v{}", env!("CARGO_PKG_VERSION"));
    println!("  GET  /health        - Health check");
    println!("  POST /v1/summarize  - Summarize a page or video");
    println!("  GET  /metrics       - Prometheus metrics");
    println!("  Server: http://{}:{}", gateway_config.host, gateway_config.port);
    println!();

    GatewayServer::new(gateway_config, pipeline)
        .with_metrics(metrics_handle)
        .run()
        .await?;

    pagebrief_governance::shutdown_tracing();
    Ok(())
}
