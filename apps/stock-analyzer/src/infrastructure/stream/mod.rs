//! Streaming Stock Price Sources
//!
//! Two [`StockStreamService`] implementations:
//!
//! - [`SyntheticStockStreamService`]: five hardcoded records, each preceded
//!   by an artificial delay. Used to demo progressive updates.
//! - [`DiskStockStreamService`]: reads a CSV file one line per element.
//!
//! Both streams are pull-driven. Nothing is read or produced ahead of the
//! consumer, so a record is only produced when the consumer asks for one.
//! Dropping the stream releases the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream;
use rust_decimal::Decimal;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio_util::sync::CancellationToken;

use crate::application::ports::{StockPriceStream, StockStreamService};
use crate::domain::stock_price::StockPrice;
use crate::error::LoadError;

/// Default delay before each synthetic record.
pub const DEFAULT_SYNTHETIC_DELAY: Duration = Duration::from_millis(500);

/// Identifier and change (in tenths) of each synthetic record, in order.
const SYNTHETIC_PRICES: [(&str, i64); 5] = [
    ("MSFT", 5),
    ("MSFT", 5),
    ("GOOG", 2),
    ("GOOG", 3),
    ("MSFT", 5),
];

// =============================================================================
// Synthetic Stream
// =============================================================================

/// Stream of five hardcoded records with a delay before each.
///
/// One more delay runs after the last record before the stream ends.
/// Cancellation observed during a delay ends the stream without error.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticStockStreamService {
    delay: Duration,
}

impl Default for SyntheticStockStreamService {
    fn default() -> Self {
        Self::new(DEFAULT_SYNTHETIC_DELAY)
    }
}

impl SyntheticStockStreamService {
    /// Create a stream source with the given per-record delay.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Per-record delay.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }
}

fn synthetic_price(index: usize) -> Option<StockPrice> {
    SYNTHETIC_PRICES
        .get(index)
        .map(|&(identifier, tenths)| StockPrice::new(identifier, Decimal::new(tenths, 1)))
}

impl StockStreamService for SyntheticStockStreamService {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn get_all_stock_prices(&self, cancel: CancellationToken) -> StockPriceStream {
        let delay = self.delay;

        Box::pin(stream::unfold(0usize, move |index| {
            let cancel = cancel.clone();
            async move {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        tracing::debug!(yielded = index, "Synthetic stream cancelled");
                        return None;
                    }
                    () = tokio::time::sleep(delay) => {}
                }
                let price = synthetic_price(index)?;
                Some((Ok(price), index + 1))
            }
        }))
    }
}

// =============================================================================
// Disk Stream
// =============================================================================

/// Stream of records read one line at a time from a CSV file.
///
/// The header line is discarded. Cancellation is checked before each read
/// and again before the line is parsed. An open, read or parse failure is
/// yielded as a final `Err`.
#[derive(Debug, Clone)]
pub struct DiskStockStreamService {
    path: PathBuf,
}

impl DiskStockStreamService {
    /// Create a stream source reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

enum DiskState {
    Unopened(PathBuf),
    Reading {
        path: PathBuf,
        lines: Lines<BufReader<File>>,
        line_number: usize,
    },
    Done,
}

impl StockStreamService for DiskStockStreamService {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn get_all_stock_prices(&self, cancel: CancellationToken) -> StockPriceStream {
        Box::pin(stream::unfold(
            DiskState::Unopened(self.path.clone()),
            move |state| {
                let cancel = cancel.clone();
                async move { next_disk_record(state, &cancel).await }
            },
        ))
    }
}

async fn next_disk_record(
    state: DiskState,
    cancel: &CancellationToken,
) -> Option<(Result<StockPrice, LoadError>, DiskState)> {
    if cancel.is_cancelled() {
        return None;
    }

    let (path, mut lines, mut line_number) = match state {
        DiskState::Done => return None,
        DiskState::Reading {
            path,
            lines,
            line_number,
        } => (path, lines, line_number),
        DiskState::Unopened(path) => match open_past_header(&path).await {
            Ok(Some(lines)) => (path, lines, 1),
            Ok(None) => return None,
            Err(error) => return Some((Err(error), DiskState::Done)),
        },
    };

    if cancel.is_cancelled() {
        return None;
    }

    let line = match lines.next_line().await {
        Ok(Some(line)) => line,
        Ok(None) => return None,
        Err(e) => return Some((Err(LoadError::io(&path, e)), DiskState::Done)),
    };
    line_number += 1;

    if cancel.is_cancelled() {
        return None;
    }

    match StockPrice::from_csv(&line) {
        Ok(price) => Some((
            Ok(price),
            DiskState::Reading {
                path,
                lines,
                line_number,
            },
        )),
        Err(e) => Some((Err(LoadError::format(line_number, e)), DiskState::Done)),
    }
}

/// Open `path` and consume its header line.
///
/// Returns `Ok(None)` for an empty file.
async fn open_past_header(path: &Path) -> Result<Option<Lines<BufReader<File>>>, LoadError> {
    let file = File::open(path).await.map_err(|e| LoadError::io(path, e))?;
    let mut lines = BufReader::new(file).lines();

    match lines.next_line().await {
        Ok(Some(_header)) => Ok(Some(lines)),
        Ok(None) => Ok(None),
        Err(e) => Err(LoadError::io(path, e)),
    }
}
