//! Search Execution
//!
//! Drives one search through a batch or streaming source and turns the
//! result into a [`SearchReport`].
//!
//! Streaming searches run the source on a background task that forwards
//! each element through a bounded channel. The caller consumes that channel
//! as a [`ReceiverStream`] and sees every matching record as soon as it
//! arrives.

use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use super::controller::SearchTicket;
use crate::application::ports::{StockService, StockStreamService};
use crate::domain::search::{SearchOutcome, SearchReport};
use crate::domain::stock_price::StockPrice;
use crate::error::LoadError;
use crate::infrastructure::metrics;

/// Default capacity of the producer → consumer channel.
const DEFAULT_STREAM_BUFFER: usize = 16;

/// Runs searches against stock price sources.
#[derive(Debug, Clone, Copy)]
pub struct SearchService {
    stream_buffer: usize,
}

impl Default for SearchService {
    fn default() -> Self {
        Self::new(DEFAULT_STREAM_BUFFER)
    }
}

impl SearchService {
    /// Create a service whose streaming channel holds `stream_buffer` elements.
    ///
    /// A zero buffer is raised to one.
    #[must_use]
    pub const fn new(stream_buffer: usize) -> Self {
        let stream_buffer = if stream_buffer == 0 { 1 } else { stream_buffer };
        Self { stream_buffer }
    }

    /// Run a batch search and wait for the full result.
    #[tracing::instrument(
        skip_all,
        fields(search_id = %ticket.id(), identifier = %ticket.identifier(), source = service.name())
    )]
    pub async fn run_batch(&self, service: &dyn StockService, ticket: &SearchTicket) -> SearchReport {
        let result = service
            .get_stock_prices_for(ticket.identifier(), ticket.token())
            .await;

        let outcome = match result {
            Ok(records) if ticket.token().is_cancelled() => SearchOutcome::Cancelled(records),
            Ok(records) => SearchOutcome::Completed(records),
            Err(error) => SearchOutcome::Failed(error),
        };

        finish(service.name(), ticket, outcome)
    }

    /// Run a streaming search, calling `on_record` for each matching record
    /// as it arrives.
    ///
    /// Only records for the ticket's identifier are delivered and kept.
    /// Once the ticket is cancelled nothing further is delivered.
    #[tracing::instrument(
        skip_all,
        fields(search_id = %ticket.id(), identifier = %ticket.identifier(), source = service.name())
    )]
    pub async fn run_stream<F>(
        &self,
        service: Arc<dyn StockStreamService>,
        ticket: &SearchTicket,
        mut on_record: F,
    ) -> SearchReport
    where
        F: FnMut(&StockPrice) + Send,
    {
        let source = service.name();
        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let producer = tokio::spawn(forward(service, ticket.token().clone(), tx));

        let mut records = Vec::new();
        let mut failure = None;
        {
            let mut incoming =
                pin!(ReceiverStream::new(rx).take_until(ticket.token().clone().cancelled_owned()));

            while let Some(item) = incoming.next().await {
                match item {
                    Ok(price) if price.is_for(ticket.identifier()) => {
                        on_record(&price);
                        records.push(price);
                    }
                    Ok(_) => {}
                    Err(error) => {
                        failure = Some(error);
                        break;
                    }
                }
            }
        }

        // The receiver is gone, so a producer blocked on send exits.
        if let Err(error) = producer.await {
            tracing::warn!(error = %error, "Stream producer task failed");
        }

        let outcome = match failure {
            Some(error) => SearchOutcome::Failed(error),
            None if ticket.token().is_cancelled() => SearchOutcome::Cancelled(records),
            None => SearchOutcome::Completed(records),
        };

        finish(source, ticket, outcome)
    }
}

/// Pump `service`'s stream into `tx` until it ends, fails or is cancelled.
async fn forward(
    service: Arc<dyn StockStreamService>,
    cancel: CancellationToken,
    tx: mpsc::Sender<Result<StockPrice, LoadError>>,
) {
    let mut stream = service.get_all_stock_prices(cancel.clone());

    while let Some(item) = stream.next().await {
        if cancel.is_cancelled() {
            break;
        }
        let is_error = item.is_err();
        if tx.send(item).await.is_err() || is_error {
            break;
        }
    }
}

fn finish(source: &'static str, ticket: &SearchTicket, outcome: SearchOutcome) -> SearchReport {
    let elapsed = ticket.elapsed();
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    metrics::record_search(source, outcome.as_str(), elapsed);

    match &outcome {
        SearchOutcome::Failed(error) => {
            metrics::record_load_error(error.kind());
            tracing::warn!(kind = %error.kind(), error = %error, elapsed_ms, "Search failed");
        }
        SearchOutcome::Completed(records) | SearchOutcome::Cancelled(records) => {
            metrics::record_records_loaded(source, records.len());
            tracing::info!(
                outcome = outcome.as_str(),
                records = records.len(),
                elapsed_ms,
                "Search finished"
            );
        }
    }

    SearchReport {
        identifier: ticket.identifier().to_string(),
        elapsed,
        outcome,
    }
}
