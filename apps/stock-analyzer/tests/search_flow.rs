//! Search Flow Integration Tests
//!
//! Drives the single-flight controller and the search service end to end
//! against real sources.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use stock_analyzer::{
    CsvStockService, InMemoryStockService, SearchController, SearchOutcome, SearchRequest,
    SearchService, SearchState, SearchTicket, SyntheticStockStreamService,
};

fn start(controller: &SearchController, identifier: &str) -> SearchTicket {
    match controller.toggle(identifier) {
        SearchRequest::Started(ticket) => ticket,
        SearchRequest::CancelRequested => panic!("controller was not idle"),
    }
}

#[tokio::test(start_paused = true)]
async fn streaming_search_completes_with_matching_records() {
    let controller = SearchController::new();
    let ticket = start(&controller, "MSFT");
    let source = Arc::new(SyntheticStockStreamService::new(Duration::from_millis(10)));

    let mut seen = 0;
    let report = SearchService::default()
        .run_stream(source, &ticket, |_| seen += 1)
        .await;

    assert!(controller.finish(&ticket));
    assert_eq!(controller.state(), SearchState::Idle);
    assert_eq!(seen, 3);
    assert!(matches!(report.outcome, SearchOutcome::Completed(ref r) if r.len() == 3));
    assert!(report.status_text().starts_with("Loaded stocks for MSFT in "));
}

#[tokio::test(start_paused = true)]
async fn toggling_mid_stream_keeps_records_already_delivered() {
    let controller = SearchController::new();
    let ticket = start(&controller, "MSFT");
    let source = Arc::new(SyntheticStockStreamService::new(Duration::from_millis(10)));

    let mut delivered = 0;
    let report = SearchService::new(1)
        .run_stream(source, &ticket, |_| {
            delivered += 1;
            if delivered == 2 {
                assert!(matches!(
                    controller.toggle("MSFT"),
                    SearchRequest::CancelRequested
                ));
            }
        })
        .await;

    // Already released by the toggle.
    assert!(!controller.finish(&ticket));
    assert_eq!(delivered, 2);
    match &report.outcome {
        SearchOutcome::Cancelled(records) => assert_eq!(records.len(), 2),
        other => panic!("expected cancelled outcome, got {other:?}"),
    }
    assert!(report.status_text().ends_with("(2 loaded)"));
}

#[tokio::test]
async fn second_toggle_cancels_instead_of_starting() {
    let controller = SearchController::new();
    let first = start(&controller, "MSFT");
    assert_eq!(controller.state().action_label(), "Cancel");

    assert!(matches!(controller.toggle("GOOG"), SearchRequest::CancelRequested));
    assert!(first.token().is_cancelled());
    assert_eq!(controller.state(), SearchState::Idle);

    let report = SearchService::default()
        .run_batch(&InMemoryStockService::default(), &first)
        .await;
    assert!(matches!(report.outcome, SearchOutcome::Cancelled(ref r) if r.is_empty()));

    let second = start(&controller, "GOOG");
    assert_ne!(first.id(), second.id());
    assert!(!second.token().is_cancelled());
}

#[tokio::test]
async fn batch_search_over_fixture() {
    let controller = SearchController::new();
    let ticket = start(&controller, "MSFT");

    let report = SearchService::default()
        .run_batch(&InMemoryStockService::default(), &ticket)
        .await;
    controller.finish(&ticket);

    assert_eq!(report.identifier, "MSFT");
    assert_eq!(report.outcome.as_str(), "completed");
    assert_eq!(report.outcome.records().len(), 2);
    assert_eq!(controller.state().action_label(), "Search");
}

#[tokio::test]
async fn failed_search_reports_error_message() {
    let controller = SearchController::new();
    let ticket = start(&controller, "MSFT");
    let source = CsvStockService::new("/definitely/not/here.csv");

    let report = SearchService::default().run_batch(&source, &ticket).await;
    controller.finish(&ticket);

    match &report.outcome {
        SearchOutcome::Failed(error) => assert_eq!(report.status_text(), error.to_string()),
        other => panic!("expected failure, got {other:?}"),
    }
}
