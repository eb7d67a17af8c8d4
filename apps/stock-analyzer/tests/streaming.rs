//! Streaming Source Integration Tests
//!
//! Tests the synthetic and disk-backed streams directly, without the
//! search service in between.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Write;
use std::time::Duration;

use futures::StreamExt;
use rust_decimal::Decimal;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use stock_analyzer::{
    DiskStockStreamService, LoadError, LoadErrorKind, StockPrice, StockStreamService,
    SyntheticStockStreamService,
};

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn assert_gap(gap: Duration, expected: Duration) {
    assert!(
        gap >= expected && gap < expected + Duration::from_millis(5),
        "gap {gap:?} is not {expected:?}"
    );
}

// =============================================================================
// Synthetic Stream
// =============================================================================

#[tokio::test(start_paused = true)]
async fn synthetic_yields_five_records_with_delays() {
    let delay = Duration::from_millis(500);
    let service = SyntheticStockStreamService::new(delay);
    let mut stream = service.get_all_stock_prices(CancellationToken::new());

    let mut last = Instant::now();
    let mut records = Vec::new();
    while let Some(item) = stream.next().await {
        let now = Instant::now();
        assert_gap(now - last, delay);
        last = now;
        records.push(item.unwrap());
    }
    // One trailing delay before the end.
    assert_gap(Instant::now() - last, delay);

    let expected: Vec<StockPrice> = [("MSFT", 5), ("MSFT", 5), ("GOOG", 2), ("GOOG", 3), ("MSFT", 5)]
        .into_iter()
        .map(|(id, tenths)| StockPrice::new(id, Decimal::new(tenths, 1)))
        .collect();
    assert_eq!(records, expected);
}

#[tokio::test(start_paused = true)]
async fn synthetic_stops_after_cancel() {
    let cancel = CancellationToken::new();
    let mut stream =
        SyntheticStockStreamService::default().get_all_stock_prices(cancel.clone());

    assert!(stream.next().await.is_some());
    assert!(stream.next().await.is_some());
    cancel.cancel();

    assert!(stream.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn synthetic_cancel_during_delay_ends_promptly() {
    let cancel = CancellationToken::new();
    let mut stream = SyntheticStockStreamService::new(Duration::from_secs(60))
        .get_all_stock_prices(cancel.clone());

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            cancel.cancel();
        })
    };

    let start = Instant::now();
    assert!(stream.next().await.is_none());
    assert!(Instant::now() - start < Duration::from_secs(60));
    canceller.await.unwrap();
}

// =============================================================================
// Disk Stream
// =============================================================================

#[tokio::test]
async fn disk_stream_skips_header() {
    let file = csv_file("Ticker,Change\nMSFT,0.5\nGOOG,0.2\nMSFT,0.7\n");
    let service = DiskStockStreamService::new(file.path());

    let records: Vec<StockPrice> = service
        .get_all_stock_prices(CancellationToken::new())
        .map(Result::unwrap)
        .collect()
        .await;

    let identifiers: Vec<&str> = records.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(identifiers, vec!["MSFT", "GOOG", "MSFT"]);
    assert_eq!(records[2].change, Decimal::new(7, 1));
}

#[tokio::test]
async fn disk_stream_blank_line_is_format_error() {
    let file = csv_file("Ticker,Change\nMSFT,0.5\n\nGOOG,0.2\n");
    let items: Vec<Result<StockPrice, LoadError>> = DiskStockStreamService::new(file.path())
        .get_all_stock_prices(CancellationToken::new())
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().identifier, "MSFT");
    match &items[1] {
        Err(LoadError::Format { line, .. }) => assert_eq!(*line, 3),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[tokio::test]
async fn disk_stream_cancel_after_n_yields_exactly_n() {
    let file = csv_file("Ticker,Change\nMSFT,0.1\nMSFT,0.2\nMSFT,0.3\nMSFT,0.4\n");
    let cancel = CancellationToken::new();
    let mut stream = DiskStockStreamService::new(file.path()).get_all_stock_prices(cancel.clone());

    let mut yielded = Vec::new();
    while let Some(item) = stream.next().await {
        yielded.push(item.unwrap());
        if yielded.len() == 2 {
            cancel.cancel();
        }
    }

    assert_eq!(yielded.len(), 2);
    assert_eq!(yielded[1].change, Decimal::new(2, 1));
}

#[tokio::test]
async fn disk_stream_cancelled_up_front_is_empty() {
    let file = csv_file("Ticker,Change\nMSFT,0.1\n");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let count = DiskStockStreamService::new(file.path())
        .get_all_stock_prices(cancel)
        .count()
        .await;
    assert_eq!(count, 0);
}

#[tokio::test]
async fn disk_stream_ends_with_format_error() {
    let file = csv_file("Ticker,Change\nMSFT,0.5\nMSFT,oops\nMSFT,0.7\n");
    let items: Vec<Result<StockPrice, LoadError>> = DiskStockStreamService::new(file.path())
        .get_all_stock_prices(CancellationToken::new())
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    match &items[1] {
        Err(LoadError::Format { line, .. }) => assert_eq!(*line, 3),
        other => panic!("expected format error, got {other:?}"),
    }
}

#[tokio::test]
async fn disk_stream_missing_file_yields_io_error() {
    let items: Vec<Result<StockPrice, LoadError>> =
        DiskStockStreamService::new("/definitely/not/here.csv")
            .get_all_stock_prices(CancellationToken::new())
            .collect()
            .await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap_err().kind(), LoadErrorKind::Io);
}
