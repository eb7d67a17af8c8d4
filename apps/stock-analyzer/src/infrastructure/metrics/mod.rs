//! Prometheus Metrics Module
//!
//! Records search and load metrics through the `metrics` facade.
//!
//! # Metrics
//!
//! - `stock_analyzer_records_loaded_total{source}`
//! - `stock_analyzer_searches_total{source, outcome}`
//! - `stock_analyzer_load_errors_total{kind}`
//! - `stock_analyzer_search_duration_seconds{source}`
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::LoadErrorKind;

static INSTALL_RESULT: OnceLock<Result<(), MetricsInitError>> = OnceLock::new();

/// The Prometheus exporter could not be installed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to install Prometheus exporter: {0}")]
pub struct MetricsInitError(String);

/// Install the Prometheus exporter, serving `/metrics` on `port`.
///
/// Only the first call installs anything. Every later or concurrent call
/// returns the first call's result, whatever `port` it passes.
///
/// # Errors
///
/// Returns an error if the recorder or HTTP listener cannot be installed.
pub fn init_metrics(port: u16) -> Result<(), MetricsInitError> {
    INSTALL_RESULT
        .get_or_init(|| {
            PrometheusBuilder::new()
                .with_http_listener(SocketAddr::from(([0, 0, 0, 0], port)))
                .install()
                .map_err(|e| MetricsInitError(e.to_string()))?;

            register_metrics();
            Ok(())
        })
        .clone()
}

fn register_metrics() {
    describe_counter!(
        "stock_analyzer_records_loaded_total",
        "Total stock price records returned by searches"
    );
    describe_counter!(
        "stock_analyzer_searches_total",
        "Total searches by outcome"
    );
    describe_counter!(
        "stock_analyzer_load_errors_total",
        "Total failed loads by error kind"
    );
    describe_histogram!(
        "stock_analyzer_search_duration_seconds",
        "Wall time from search start to finish"
    );
}

/// Record records returned by a search.
pub fn record_records_loaded(source: &'static str, count: usize) {
    counter!("stock_analyzer_records_loaded_total", "source" => source)
        .increment(u64::try_from(count).unwrap_or(u64::MAX));
}

/// Record a finished search and its duration.
pub fn record_search(source: &'static str, outcome: &'static str, duration: Duration) {
    counter!(
        "stock_analyzer_searches_total",
        "source" => source,
        "outcome" => outcome
    )
    .increment(1);
    histogram!("stock_analyzer_search_duration_seconds", "source" => source)
        .record(duration.as_secs_f64());
}

/// Record a failed load.
pub fn record_load_error(kind: LoadErrorKind) {
    counter!("stock_analyzer_load_errors_total", "kind" => kind.as_str()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrent_init_installs_once() {
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| init_metrics(0))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|r| *r == results[0]));
        assert_eq!(init_metrics(9), results[0]);
    }

    #[test]
    fn recording_is_infallible() {
        record_records_loaded("csv", 3);
        record_search("csv", "completed", Duration::from_millis(5));
        record_load_error(LoadErrorKind::Format);
    }
}
