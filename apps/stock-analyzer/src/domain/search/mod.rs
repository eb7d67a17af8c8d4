//! Search State and Reports
//!
//! Value types describing a single search: whether one is in flight, how it
//! ended, and the status line shown to the user afterwards.

use std::time::Duration;

use crate::domain::stock_price::StockPrice;
use crate::error::LoadError;

/// Whether a search is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    /// No search running; a start request begins one.
    #[default]
    Idle,
    /// A search is in flight; a start request cancels it.
    Running,
}

impl SearchState {
    /// Label for the start/cancel action in this state.
    #[must_use]
    pub const fn action_label(&self) -> &'static str {
        match self {
            Self::Idle => "Search",
            Self::Running => "Cancel",
        }
    }
}

/// How a search ended.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Source was exhausted.
    Completed(Vec<StockPrice>),
    /// Cancellation was observed; holds what arrived before it.
    Cancelled(Vec<StockPrice>),
    /// Source failed. Records delivered before the failure are kept by the caller.
    Failed(LoadError),
}

impl SearchOutcome {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::Cancelled(_) => "cancelled",
            Self::Failed(_) => "failed",
        }
    }

    /// Records gathered, empty on failure.
    #[must_use]
    pub fn records(&self) -> &[StockPrice] {
        match self {
            Self::Completed(records) | Self::Cancelled(records) => records,
            Self::Failed(_) => &[],
        }
    }
}

/// Result of one search, ready for display.
#[derive(Debug)]
pub struct SearchReport {
    /// Ticker that was searched.
    pub identifier: String,
    /// Wall time from start to finish.
    pub elapsed: Duration,
    /// How the search ended.
    pub outcome: SearchOutcome,
}

impl SearchReport {
    /// Status line for the user.
    ///
    /// Failures show the error message verbatim.
    #[must_use]
    pub fn status_text(&self) -> String {
        let elapsed_ms = self.elapsed.as_millis();
        match &self.outcome {
            SearchOutcome::Completed(_) => {
                format!("Loaded stocks for {} in {elapsed_ms}ms", self.identifier)
            }
            SearchOutcome::Cancelled(records) => format!(
                "Cancelled search for {} after {elapsed_ms}ms ({} loaded)",
                self.identifier,
                records.len()
            ),
            SearchOutcome::Failed(error) => error.to_string(),
        }
    }
}
