//! Domain Layer - Stock price records and search outcomes.
//!
//! This layer contains the core value types with no I/O. Everything here
//! is plain Rust with serialization support.

/// Stock price records and the CSV line parser.
pub mod stock_price;

/// Search state and reports.
pub mod search;
