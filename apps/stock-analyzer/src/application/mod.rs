//! Application Layer - Ports and search orchestration.
//!
//! This layer defines the capabilities every stock price source provides
//! and the services that drive a single search through them.

/// Port interfaces for stock price sources (batch and streaming).
pub mod ports;

/// Single-flight search control and execution.
pub mod services;
