//! Stock Analyzer Binary
//!
//! Runs one search against the configured source and logs the result.
//! Press Ctrl+C while the search is running to cancel it; the records
//! loaded so far are still reported.
//!
//! # Usage
//!
//! ```bash
//! STOCK_ANALYZER_SOURCE=stream-mock cargo run --bin stock-analyzer
//! ```
//!
//! # Environment Variables
//!
//! - `STOCK_ANALYZER_IDENTIFIER`: Ticker to search (default: MSFT)
//! - `STOCK_ANALYZER_SOURCE`: csv | mock | http | stream-mock | stream-disk (default: csv)
//! - `STOCK_ANALYZER_CSV_PATH`: CSV file (default: StockPrices_Small.csv)
//! - `STOCK_ANALYZER_API_URL`: Remote provider base URL
//! - `STOCK_ANALYZER_HTTP_TIMEOUT_SECS`: Remote request timeout (default: 30)
//! - `STOCK_ANALYZER_MOCK_DELAY_MS`: Synthetic stream delay (default: 500)
//! - `STOCK_ANALYZER_STREAM_BUFFER`: Stream channel capacity (default: 16)
//! - `STOCK_ANALYZER_METRICS_PORT`: Prometheus port, 0 disables (default: 0)
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `RUST_LOG`: Log level (default: info)

use std::pin::pin;
use std::sync::Arc;

use anyhow::Context;
use stock_analyzer::{
    AnalyzerConfig, CsvStockService, DiskStockStreamService, HttpStockService,
    InMemoryStockService, SearchController, SearchOutcome, SearchReport, SearchRequest,
    SearchService, SearchTicket, SourceKind, StockPrice, SyntheticStockStreamService,
    init_metrics, init_telemetry,
};
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let _telemetry_guard = init_telemetry();

    let config = AnalyzerConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    if config.metrics_port != 0 {
        init_metrics(config.metrics_port).context("failed to start metrics exporter")?;
        tracing::info!(port = config.metrics_port, "Prometheus metrics enabled");
    }

    let controller = SearchController::new();
    let SearchRequest::Started(ticket) = controller.toggle(config.identifier.clone()) else {
        anyhow::bail!("a search is already running");
    };
    tracing::info!(
        identifier = %config.identifier,
        action = controller.state().action_label(),
        "Searching"
    );

    let service = SearchService::new(config.stream.buffer);
    let mut search = pin!(run_search(&config, service, &ticket));

    let report = tokio::select! {
        report = &mut search => report?,
        result = signal::ctrl_c() => {
            result.context("failed to listen for Ctrl+C")?;
            if matches!(controller.toggle(config.identifier.clone()), SearchRequest::CancelRequested) {
                tracing::info!("Received Ctrl+C, cancelling search");
            }
            search.await?
        }
    };

    controller.finish(&ticket);
    log_report(&report, config.source.is_streaming());

    Ok(())
}

/// Run the search against the configured source.
async fn run_search(
    config: &AnalyzerConfig,
    service: SearchService,
    ticket: &SearchTicket,
) -> anyhow::Result<SearchReport> {
    let report = match config.source {
        SourceKind::Csv => {
            let source = CsvStockService::new(config.csv_path.clone());
            service.run_batch(&source, ticket).await
        }
        SourceKind::Mock => {
            service
                .run_batch(&InMemoryStockService::default(), ticket)
                .await
        }
        SourceKind::Http => {
            let source = HttpStockService::new(&config.http)?;
            service.run_batch(&source, ticket).await
        }
        SourceKind::StreamMock => {
            let source = Arc::new(SyntheticStockStreamService::new(config.stream.mock_delay));
            service.run_stream(source, ticket, log_record).await
        }
        SourceKind::StreamDisk => {
            let source = Arc::new(DiskStockStreamService::new(config.csv_path.clone()));
            service.run_stream(source, ticket, log_record).await
        }
    };
    Ok(report)
}

fn log_record(price: &StockPrice) {
    tracing::info!(
        identifier = %price.identifier,
        change = %price.change,
        change_percent = ?price.change_percent,
        trade_date = ?price.trade_date,
        "Stock price"
    );
}

/// Log the loaded records (batch sources only) and the status line.
fn log_report(report: &SearchReport, streamed: bool) {
    if !streamed {
        report.outcome.records().iter().for_each(log_record);
    }

    match &report.outcome {
        SearchOutcome::Failed(error) => {
            tracing::error!(kind = %error.kind(), "{}", report.status_text());
        }
        outcome => {
            tracing::info!(
                outcome = outcome.as_str(),
                records = outcome.records().len(),
                "{}",
                report.status_text()
            );
        }
    }
}

/// Log the parsed configuration.
fn log_config(config: &AnalyzerConfig) {
    tracing::info!(
        identifier = %config.identifier,
        source = config.source.as_str(),
        metrics_port = config.metrics_port,
        "Configuration loaded"
    );
    tracing::debug!(
        csv_path = %config.csv_path.display(),
        api_url = %config.http.api_url,
        mock_delay_ms = config.stream.mock_delay.as_millis(),
        stream_buffer = config.stream.buffer,
        "Source settings"
    );
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
