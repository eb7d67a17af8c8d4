//! CSV Line-Batch Loader
//!
//! Reads a whole CSV source into memory as lines, then parses and filters
//! them in a second pass.
//!
//! Cancellation is checked at line boundaries only. It is polled before each
//! read and again when a read completes, so a line that finishes reading
//! after cancellation is discarded and nothing past it is read.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::application::ports::StockService;
use crate::domain::stock_price::StockPrice;
use crate::error::LoadError;

/// Read every line of `reader` in order, stopping early on cancellation.
///
/// Line terminators (`\n` or `\r\n`) are stripped. A cancelled read returns
/// the lines gathered so far, never an error.
///
/// # Errors
///
/// Returns the underlying I/O error if a read fails.
pub async fn load_lines<R>(reader: R, cancel: &CancellationToken) -> std::io::Result<Vec<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut collected = Vec::new();

    while !cancel.is_cancelled() {
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if cancel.is_cancelled() {
            break;
        }
        collected.push(line);
    }

    tracing::debug!(
        lines = collected.len(),
        cancelled = cancel.is_cancelled(),
        "Lines loaded"
    );
    Ok(collected)
}

/// Open `path` and [`load_lines`] from it.
///
/// The file is closed when this returns.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if the file cannot be opened or read.
pub async fn load_lines_from_path(
    path: impl AsRef<Path>,
    cancel: &CancellationToken,
) -> Result<Vec<String>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)
        .await
        .map_err(|e| LoadError::io(path, e))?;

    load_lines(BufReader::new(file), cancel)
        .await
        .map_err(|e| LoadError::io(path, e))
}

/// Parse every line after the header, then keep the records for `identifier`.
///
/// A blank line is malformed like any other. The first malformed line aborts
/// the whole batch.
///
/// # Errors
///
/// Returns [`LoadError::Format`] with the 1-based line number of the first
/// line that fails to parse.
pub fn parse_records(lines: &[String], identifier: &str) -> Result<Vec<StockPrice>, LoadError> {
    let mut records = Vec::new();

    for (index, line) in lines.iter().enumerate().skip(1) {
        let price = StockPrice::from_csv(line).map_err(|e| LoadError::format(index + 1, e))?;
        records.push(price);
    }

    records.retain(|price| price.is_for(identifier));
    Ok(records)
}

/// Batch [`StockService`] backed by a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvStockService {
    path: PathBuf,
}

impl CsvStockService {
    /// Create a service reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StockService for CsvStockService {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn get_stock_prices_for(
        &self,
        identifier: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StockPrice>, LoadError> {
        let lines = load_lines_from_path(&self.path, cancel).await?;
        let records = parse_records(&lines, identifier)?;

        tracing::debug!(
            path = %self.path.display(),
            lines = lines.len(),
            records = records.len(),
            "CSV batch parsed"
        );
        Ok(records)
    }
}
