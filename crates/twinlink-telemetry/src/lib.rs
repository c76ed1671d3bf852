//! Logging setup for twinlink binaries.
//!
//! [`init`] installs a global `tracing` subscriber whose format and default
//! level follow the deployment [`Environment`]. `RUST_LOG` always overrides
//! the default level. When an OTLP endpoint is configured, spans are also
//! exported over gRPC until the returned [`TelemetryGuard`] is dropped.

mod environment;
mod error;

pub use environment::Environment;
pub use error::{Result, TelemetryError};

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, TypedBuilder)]
pub struct TelemetryConfig {
    #[builder(default)]
    environment: Environment,
    #[builder(default = "twinlink".to_string(), setter(into))]
    service_name: String,
    /// gRPC collector endpoint, e.g. `http://localhost:4317`.
    #[builder(default, setter(into))]
    otlp_endpoint: Option<String>,
}

impl TelemetryConfig {
    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn otlp_endpoint(&self) -> Option<&str> {
        self.otlp_endpoint.as_deref()
    }
}

/// Flushes and shuts down the span exporter when dropped.
#[derive(Debug)]
#[must_use = "dropping the guard stops span export"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("failed to shut down tracer provider: {err}");
            }
        }
    }
}

fn env_filter(environment: Environment) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(environment.default_level()))
        .map_err(|e| TelemetryError::Config(e.to_string()))
}

fn tracer_provider(service_name: &str, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .map_err(|e| TelemetryError::Exporter(e.to_string()))?;

    let resource = Resource::builder()
        .with_service_name(service_name.to_owned())
        .build();

    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Installs the global subscriber.
///
/// Fails if a global subscriber is already set or the exporter cannot be built.
pub fn init(config: &TelemetryConfig) -> Result<TelemetryGuard> {
    let filter = env_filter(config.environment)?;

    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| tracer_provider(&config.service_name, endpoint))
        .transpose()?;

    let otel_layer = provider.as_ref().map(|provider| {
        opentelemetry::global::set_tracer_provider(provider.clone());
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    let (pretty, json) = if config.environment.is_json() {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer().pretty()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(otel_layer)
        .with(pretty)
        .with(json)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    tracing::debug!(
        environment = %config.environment,
        otlp = config.otlp_endpoint.is_some(),
        "telemetry initialised"
    );

    Ok(TelemetryGuard { provider })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = TelemetryConfig::builder().build();

        assert_eq!(config.environment(), Environment::Local);
        assert_eq!(config.service_name, "twinlink");
        assert!(config.otlp_endpoint().is_none());
    }

    #[test]
    fn config_with_endpoint() {
        let config = TelemetryConfig::builder()
            .environment(Environment::Prod)
            .otlp_endpoint(Some("http://localhost:4317".to_string()))
            .build();

        assert_eq!(config.otlp_endpoint(), Some("http://localhost:4317"));
    }

    #[test]
    fn guard_without_provider_drops_quietly() {
        drop(TelemetryGuard { provider: None });
    }
}
