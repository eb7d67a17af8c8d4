//! Single-Flight Search Controller
//!
//! Tracks the one search a caller may have in flight. The same "start"
//! action doubles as "cancel": toggling while a search runs signals its
//! token instead of starting a second one.
//!
//! # Example
//!
//! ```rust
//! use stock_analyzer::{SearchController, SearchRequest, SearchState};
//!
//! let controller = SearchController::new();
//!
//! let SearchRequest::Started(ticket) = controller.toggle("MSFT") else {
//!     unreachable!("controller starts idle");
//! };
//! assert_eq!(controller.state(), SearchState::Running);
//!
//! // Pressing start again cancels the running search.
//! assert!(matches!(controller.toggle("MSFT"), SearchRequest::CancelRequested));
//! assert!(ticket.token().is_cancelled());
//! assert_eq!(controller.state(), SearchState::Idle);
//! ```

use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::search::SearchState;

/// Handle for one started search.
///
/// Cloning shares the same cancellation token.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    id: Uuid,
    identifier: String,
    token: CancellationToken,
    started_at: Instant,
}

impl SearchTicket {
    fn new(identifier: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier,
            token: CancellationToken::new(),
            started_at: Instant::now(),
        }
    }

    /// Unique search ID, for log correlation.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Ticker being searched.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Cancellation token observed by the loader.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Time since the search started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Result of [`SearchController::toggle`].
#[derive(Debug)]
pub enum SearchRequest {
    /// Controller was idle; a new search should run with this ticket.
    Started(SearchTicket),
    /// A search was in flight and has been signalled to stop.
    CancelRequested,
}

#[derive(Debug)]
struct InFlight {
    id: Uuid,
    token: CancellationToken,
}

/// At-most-one-in-flight guard for searches.
#[derive(Debug, Default)]
pub struct SearchController {
    in_flight: Mutex<Option<InFlight>>,
}

impl SearchController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a search, or cancel the one in flight.
    pub fn toggle(&self, identifier: impl Into<String>) -> SearchRequest {
        let mut slot = self.in_flight.lock();

        if let Some(current) = slot.take() {
            current.token.cancel();
            tracing::info!(search_id = %current.id, "Cancellation requested");
            return SearchRequest::CancelRequested;
        }

        let ticket = SearchTicket::new(identifier.into());
        *slot = Some(InFlight {
            id: ticket.id,
            token: ticket.token.clone(),
        });
        tracing::debug!(
            search_id = %ticket.id,
            identifier = %ticket.identifier,
            "Search started"
        );
        SearchRequest::Started(ticket)
    }

    /// Mark `ticket`'s search as finished.
    ///
    /// Returns `false` if the ticket is no longer the in-flight one, which
    /// happens when it was already cancelled through [`toggle`](Self::toggle).
    pub fn finish(&self, ticket: &SearchTicket) -> bool {
        let mut slot = self.in_flight.lock();
        if slot.as_ref().is_some_and(|current| current.id == ticket.id) {
            *slot = None;
            return true;
        }
        false
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SearchState {
        if self.in_flight.lock().is_some() {
            SearchState::Running
        } else {
            SearchState::Idle
        }
    }

    /// Check if a search is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == SearchState::Running
    }
}
