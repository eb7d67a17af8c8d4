//! Configuration Module
//!
//! Configuration loading for the analyzer binary.

mod settings;

pub use settings::{AnalyzerConfig, ConfigError, HttpSettings, SourceKind, StreamSettings};
