//! Port Interfaces
//!
//! The two capabilities a stock price source can offer. Both take a
//! cooperative [`CancellationToken`]; neither treats cancellation as an
//! error.
//!
//! - `StockService`: batch, returns a fully materialized list for one ticker
//! - `StockStreamService`: streaming, yields records one at a time

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::domain::stock_price::StockPrice;
use crate::error::LoadError;

/// Lazy, finite, non-restartable sequence of stock prices.
///
/// An `Err` element is always the last one.
pub type StockPriceStream = Pin<Box<dyn Stream<Item = Result<StockPrice, LoadError>> + Send>>;

/// Batch source: loads everything, then returns the records for one ticker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockService: Send + Sync {
    /// Short source name for logs and metric labels.
    fn name(&self) -> &'static str;

    /// Load all records for `identifier`.
    ///
    /// If `cancel` fires mid-load, returns the records gathered so far.
    async fn get_stock_prices_for(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StockPrice>, LoadError>;
}

/// Streaming source: yields every record as it becomes available.
#[cfg_attr(test, mockall::automock)]
pub trait StockStreamService: Send + Sync {
    /// Short source name for logs and metric labels.
    fn name(&self) -> &'static str;

    /// Open a new stream that ends early once `cancel` fires.
    fn get_all_stock_prices(&self, cancel: CancellationToken) -> StockPriceStream;
}
