//! Distributed tracing configuration.

use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{runtime, trace as sdktrace, Resource};
use pagebrief_core::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,pagebrief=debug";
const SERVICE_NAME: &str = "pagebrief";

/// Configure stdout logging, plus OpenTelemetry export when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
pub fn configure_tracing(json_logs: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.into()),
    );

    // Exactly one of these is Some
    let (plain_layer, json_layer) = if json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(plain_layer)
        .with(json_layer);

    let result = if let Ok(endpoint) = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT") {
        let provider = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(
                opentelemetry_otlp::new_exporter()
                    .tonic()
                    .with_endpoint(endpoint.clone()),
            )
            .with_trace_config(
                sdktrace::Config::default().with_resource(Resource::new(vec![KeyValue::new(
                    "service.name",
                    SERVICE_NAME,
                )])),
            )
            .install_batch(runtime::Tokio)
            .map_err(|e| Error::configuration(format!("Failed to install OTLP pipeline: {}", e)))?;

        let tracer = provider.tracer(SERVICE_NAME);
        global::set_tracer_provider(provider);

        let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
        let result = registry.with(otel_layer).try_init();
        tracing::info!(endpoint = %endpoint, "OpenTelemetry tracing enabled");
        result
    } else {
        registry.try_init()
    };

    result.map_err(|e| Error::configuration(format!("Failed to install tracing subscriber: {}", e)))
}

/// Flush buffered spans and release the global tracer provider.
///
/// Call once the server has stopped; a no-op when OTLP export is off.
pub fn shutdown_tracing() {
    global::shutdown_tracer_provider();
}
