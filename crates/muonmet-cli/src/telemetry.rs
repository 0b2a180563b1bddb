//! Logging and trace export for the `muonmet` binary.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`). |
//! | `MUONMET_LOG_FORMAT=json` | Newline-delimited JSON logs instead of the compact format. |
//!
//! Spans are also exported over OTLP/HTTP when the configuration carries an
//! `otlp_endpoint` (see [`crate::config`]). Logs go to stderr; stdout is
//! reserved for reports.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_env() -> Self {
        match std::env::var("MUONMET_LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

/// Install the global subscriber, exporting spans to `otlp_endpoint` when
/// given. Hold the returned guard until exit so that pending spans are
/// flushed.
pub fn init_tracing(service_name: &str, otlp_endpoint: Option<&str>) -> TracerProviderGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let provider = otlp_endpoint.and_then(|endpoint| match span_exporter(endpoint) {
        Ok(exporter) => Some(tracer_provider(service_name, exporter)),
        Err(reason) => {
            eprintln!("[muonmet] trace export to {endpoint} disabled: {reason}");
            None
        }
    });

    let otel_layer = provider
        .as_ref()
        .map(|p| tracing_opentelemetry::layer().with_tracer(p.tracer("muonmet")));
    let (compact, json) = match LogFormat::from_env() {
        LogFormat::Compact => (
            Some(fmt::layer().compact().with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(otel_layer)
        .with(compact)
        .with(json)
        .init();

    TracerProviderGuard(provider)
}

/// Shuts the OTLP provider down, flushing spans, when dropped.
pub struct TracerProviderGuard(Option<SdkTracerProvider>);

impl Drop for TracerProviderGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.0.take()
            && let Err(e) = provider.shutdown()
        {
            eprintln!("[muonmet] OpenTelemetry provider shutdown error: {e}");
        }
    }
}

fn span_exporter(endpoint: &str) -> Result<opentelemetry_otlp::SpanExporter, String> {
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err("endpoint must be an http(s) URL".to_string());
    }
    opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| e.to_string())
}

/// Spans are exported one by one as they close; a batch job has no async
/// runtime to host a batching exporter.
fn tracer_provider(
    service_name: &str,
    exporter: opentelemetry_otlp::SpanExporter,
) -> SdkTracerProvider {
    SdkTracerProvider::builder()
        .with_resource(
            Resource::builder()
                .with_service_name(service_name.to_string())
                .build(),
        )
        .with_simple_exporter(exporter)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_http_endpoint_is_rejected() {
        assert!(span_exporter("collector:4318").is_err());
    }

    #[test]
    fn empty_guard_drops_cleanly() {
        drop(TracerProviderGuard(None));
    }

    #[test]
    fn log_format_defaults_to_compact() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::remove_var("MUONMET_LOG_FORMAT") };
        assert_eq!(LogFormat::from_env(), LogFormat::Compact);
    }
}
