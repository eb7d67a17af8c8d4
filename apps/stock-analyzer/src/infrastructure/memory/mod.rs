//! In-Memory Stock Source
//!
//! A batch [`StockService`] over a fixed set of records. Useful for tests
//! and demos that need no file or network.

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;

use crate::application::ports::StockService;
use crate::domain::stock_price::StockPrice;
use crate::error::LoadError;

/// Batch source backed by a `Vec` of records.
#[derive(Debug, Clone)]
pub struct InMemoryStockService {
    records: Vec<StockPrice>,
}

impl Default for InMemoryStockService {
    /// The built-in fixture: two MSFT and two GOOG records.
    fn default() -> Self {
        Self::new(vec![
            StockPrice::new("MSFT", Decimal::new(5, 1)).with_change_percent(Decimal::new(75, 2)),
            StockPrice::new("MSFT", Decimal::new(2, 1)).with_change_percent(Decimal::new(15, 2)),
            StockPrice::new("GOOG", Decimal::new(3, 1)).with_change_percent(Decimal::new(25, 2)),
            StockPrice::new("GOOG", Decimal::new(5, 1)).with_change_percent(Decimal::new(65, 2)),
        ])
    }
}

impl InMemoryStockService {
    /// Create a source over `records`.
    #[must_use]
    pub const fn new(records: Vec<StockPrice>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl StockService for InMemoryStockService {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get_stock_prices_for(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StockPrice>, LoadError> {
        if cancel.is_cancelled() {
            return Ok(Vec::new());
        }

        Ok(self
            .records
            .iter()
            .filter(|price| price.is_for(identifier))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_has_two_msft_records() {
        let service = InMemoryStockService::default();
        let stocks = service
            .get_stock_prices_for("MSFT", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(stocks.len(), 2);
        assert!(stocks.iter().all(|s| s.identifier == "MSFT"));
    }

    #[tokio::test]
    async fn unknown_ticker_is_empty() {
        let service = InMemoryStockService::default();
        let stocks = service
            .get_stock_prices_for("AAPL", &CancellationToken::new())
            .await
            .unwrap();
        assert!(stocks.is_empty());
    }

    #[tokio::test]
    async fn cancelled_returns_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let stocks = InMemoryStockService::default()
            .get_stock_prices_for("MSFT", &cancel)
            .await
            .unwrap();
        assert!(stocks.is_empty());
    }
}
