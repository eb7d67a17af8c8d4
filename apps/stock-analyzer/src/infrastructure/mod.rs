//! Infrastructure Layer - Adapters and ambient plumbing.
//!
//! This layer contains the concrete implementations of the port interfaces
//! defined in the application layer.

/// CSV line-batch loader and CSV-backed batch service.
pub mod csv;

/// Synthetic and disk-backed streaming sources.
pub mod stream;

/// In-memory fixture source.
pub mod memory;

/// Remote HTTP stock provider.
pub mod http;

/// Configuration loaded from the environment.
pub mod config;

/// Prometheus metrics instrumentation.
pub mod metrics;

/// Tracing subscriber and OpenTelemetry integration.
pub mod telemetry;
