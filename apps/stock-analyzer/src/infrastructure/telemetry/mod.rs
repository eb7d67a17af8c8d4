//! Logging and Trace Export
//!
//! Installs the global `tracing` subscriber: an `EnvFilter`, a fmt layer on
//! stderr and, when enabled, an OpenTelemetry layer exporting spans over
//! OTLP/gRPC.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Filter directives (default: `stock_analyzer=info`)
//! - `OTEL_ENABLED`: "true" turns on span export (default: off)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: Collector endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Reported service name (default: stock-analyzer)

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "stock_analyzer=info";
const DEFAULT_ENDPOINT: &str = "http://localhost:4317";
const DEFAULT_SERVICE: &str = "stock-analyzer";

/// Span export settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Export spans over OTLP.
    pub enabled: bool,
    /// Collector endpoint.
    pub otlp_endpoint: String,
    /// Service name attached to every span.
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: DEFAULT_ENDPOINT.to_string(),
            service_name: DEFAULT_SERVICE.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings from an arbitrary key lookup; unset keys keep defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            enabled: lookup("OTEL_ENABLED").is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or(defaults.otlp_endpoint),
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
        }
    }
}

/// Keeps the tracer provider alive; flushes and shuts it down on drop.
#[must_use = "dropping the guard stops span export"]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl TelemetryGuard {
    /// Whether spans are being exported.
    #[must_use]
    pub const fn is_exporting(&self) -> bool {
        self.provider.is_some()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let Some(provider) = self.provider.take() else {
            return;
        };
        if let Err(e) = provider.shutdown() {
            eprintln!("tracer provider shutdown failed: {e}");
        }
    }
}

/// Install the global subscriber using [`TelemetryConfig::from_env`].
pub fn init() -> TelemetryGuard {
    init_with_config(&TelemetryConfig::from_env())
}

/// Install the global subscriber.
///
/// An exporter that cannot be built is reported on stderr and logging
/// continues locally.
pub fn init_with_config(config: &TelemetryConfig) -> TelemetryGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let provider = if config.enabled {
        build_provider(config)
    } else {
        None
    };
    let otel_layer = provider.as_ref().map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(config.service_name.clone()))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(otel_layer)
        .init();

    TelemetryGuard { provider }
}

fn build_provider(config: &TelemetryConfig) -> Option<SdkTracerProvider> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otlp_endpoint)
        .build();

    match exporter {
        Ok(exporter) => Some(
            SdkTracerProvider::builder()
                .with_batch_exporter(exporter)
                .with_resource(
                    Resource::builder()
                        .with_service_name(config.service_name.clone())
                        .build(),
                )
                .build(),
        ),
        Err(e) => {
            eprintln!("OTLP exporter unavailable, logging locally only: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> TelemetryConfig {
        let vars: HashMap<&str, &str> = pairs.iter().copied().collect();
        TelemetryConfig::from_lookup(|key| vars.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn export_is_off_by_default() {
        let config = config_from(&[]);
        assert_eq!(config, TelemetryConfig::default());
        assert!(!config.enabled);
        assert_eq!(config.service_name, "stock-analyzer");
    }

    #[test]
    fn overrides_from_lookup() {
        let config = config_from(&[
            ("OTEL_ENABLED", "TRUE"),
            ("OTEL_EXPORTER_OTLP_ENDPOINT", "http://collector:4317"),
            ("OTEL_SERVICE_NAME", "analyzer-dev"),
        ]);
        assert!(config.enabled);
        assert_eq!(config.otlp_endpoint, "http://collector:4317");
        assert_eq!(config.service_name, "analyzer-dev");
    }

    #[test]
    fn only_true_enables_export() {
        assert!(!config_from(&[("OTEL_ENABLED", "1")]).enabled);
        assert!(!config_from(&[("OTEL_ENABLED", "yes")]).enabled);
    }
}
