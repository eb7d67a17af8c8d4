#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Stock Analyzer - Cancellable Stock Price Loading
//!
//! Loads stock price records from a CSV file, an in-memory fixture, a
//! synthetic delayed stream, a file-backed stream or a remote HTTP provider.
//! Every load takes a [`CancellationToken`](tokio_util::sync::CancellationToken)
//! and stops cooperatively at line or delay boundaries.
//!
//! # Layers (inside → outside)
//!
//! - **Domain**: Stock price records and search outcomes
//!   - `stock_price`: The `StockPrice` value type and CSV line parser
//!   - `search`: Search state and reports
//!
//! - **Application**: Port definitions and search orchestration
//!   - `ports`: Batch (`StockService`) and streaming (`StockStreamService`) capabilities
//!   - `services`: Single-flight `SearchController` and `SearchService`
//!
//! - **Infrastructure**: Concrete loaders and ambient plumbing
//!   - `csv`: Line-batch loader and CSV-backed batch service
//!   - `stream`: Synthetic and disk-backed streams
//!   - `memory`: In-memory fixture service
//!   - `http`: Remote HTTP provider
//!   - `config`, `telemetry`, `metrics`
//!
//! # Data Flow
//!
//! ```text
//! CSV file ──► load_lines ──► parse_records ──► Vec<StockPrice> ──┐
//!                                                                 ├──► SearchService ──► SearchReport
//! CSV file / synthetic ──► Stream<StockPrice> ──► mpsc ──► ReceiverStream ──┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Module Declarations
// =============================================================================

/// Domain layer - Stock price records and search outcomes.
pub mod domain;

/// Application layer - Ports and search orchestration.
pub mod application;

/// Infrastructure layer - Loaders, config and observability.
pub mod infrastructure;

/// Load errors shared by every source.
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

// Domain types
pub use domain::search::{SearchOutcome, SearchReport, SearchState};
pub use domain::stock_price::{ParseError, StockPrice};

// Errors
pub use error::{LoadError, LoadErrorKind};

// Ports and services
pub use application::ports::{StockPriceStream, StockService, StockStreamService};
pub use application::services::{SearchController, SearchRequest, SearchService, SearchTicket};

// Loaders
pub use infrastructure::csv::{CsvStockService, load_lines, load_lines_from_path, parse_records};
pub use infrastructure::http::HttpStockService;
pub use infrastructure::memory::InMemoryStockService;
pub use infrastructure::stream::{DiskStockStreamService, SyntheticStockStreamService};

// Infrastructure config
pub use infrastructure::config::{
    AnalyzerConfig, ConfigError, HttpSettings, SourceKind, StreamSettings,
};

// Metrics
pub use infrastructure::metrics::{MetricsInitError, init_metrics};

// Telemetry
pub use infrastructure::telemetry::{TelemetryConfig, TelemetryGuard, init as init_telemetry};
