//! Analyzer Configuration Settings
//!
//! Configuration types for the analyzer, loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Default ticker to search.
const DEFAULT_IDENTIFIER: &str = "MSFT";

/// Default CSV fixture path.
const DEFAULT_CSV_PATH: &str = "StockPrices_Small.csv";

/// Default remote provider URL.
const DEFAULT_API_URL: &str = "https://ps-async.fekberg.com/api/stocks";

/// Which stock price source to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// CSV file, loaded as a batch.
    #[default]
    Csv,
    /// In-memory fixture, loaded as a batch.
    Mock,
    /// Remote HTTP provider, loaded as a batch.
    Http,
    /// Synthetic delayed stream.
    StreamMock,
    /// CSV file, streamed line by line.
    StreamDisk,
}

impl SourceKind {
    /// Parse a source name, ignoring case.
    ///
    /// Returns `None` for unknown names.
    #[must_use]
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "mock" => Some(Self::Mock),
            "http" => Some(Self::Http),
            "stream-mock" => Some(Self::StreamMock),
            "stream-disk" => Some(Self::StreamDisk),
            _ => None,
        }
    }

    /// Get the source name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Mock => "mock",
            Self::Http => "http",
            Self::StreamMock => "stream-mock",
            Self::StreamDisk => "stream-disk",
        }
    }

    /// Check if this source is consumed as a stream.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::StreamMock | Self::StreamDisk)
    }
}

/// Remote provider settings.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Base URL; the identifier is appended as a path segment.
    pub api_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Streaming settings.
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Delay before each synthetic record.
    pub mock_delay: Duration,
    /// Capacity of the producer → consumer channel.
    pub buffer: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            mock_delay: Duration::from_millis(500),
            buffer: 16,
        }
    }
}

/// Complete analyzer configuration.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Ticker to search.
    pub identifier: String,
    /// Source to search.
    pub source: SourceKind,
    /// CSV file for the `csv` and `stream-disk` sources.
    pub csv_path: PathBuf,
    /// Remote provider settings.
    pub http: HttpSettings,
    /// Streaming settings.
    pub stream: StreamSettings,
    /// Prometheus listener port (0 = disabled).
    pub metrics_port: u16,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_string(),
            source: SourceKind::default(),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            http: HttpSettings::default(),
            stream: StreamSettings::default(),
            metrics_port: 0,
        }
    }
}

impl AnalyzerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or the source is unknown.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is empty or the source is unknown.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let identifier = match lookup("STOCK_ANALYZER_IDENTIFIER") {
            Some(value) if value.trim().is_empty() => {
                return Err(ConfigError::EmptyValue(
                    "STOCK_ANALYZER_IDENTIFIER".to_string(),
                ));
            }
            Some(value) => value.trim().to_string(),
            None => defaults.identifier,
        };

        let source = match lookup("STOCK_ANALYZER_SOURCE") {
            Some(value) => SourceKind::from_str_case_insensitive(&value).ok_or_else(|| {
                ConfigError::InvalidValue {
                    key: "STOCK_ANALYZER_SOURCE".to_string(),
                    value,
                }
            })?,
            None => defaults.source,
        };

        let csv_path = lookup("STOCK_ANALYZER_CSV_PATH").map_or(defaults.csv_path, PathBuf::from);

        let http = HttpSettings {
            api_url: lookup("STOCK_ANALYZER_API_URL").unwrap_or(defaults.http.api_url),
            timeout: parse_duration_secs(
                lookup("STOCK_ANALYZER_HTTP_TIMEOUT_SECS"),
                defaults.http.timeout,
            ),
        };

        let stream = StreamSettings {
            mock_delay: parse_duration_millis(
                lookup("STOCK_ANALYZER_MOCK_DELAY_MS"),
                defaults.stream.mock_delay,
            ),
            buffer: parse_or(lookup("STOCK_ANALYZER_STREAM_BUFFER"), defaults.stream.buffer),
        };

        let metrics_port = parse_or(lookup("STOCK_ANALYZER_METRICS_PORT"), defaults.metrics_port);

        Ok(Self {
            identifier,
            source,
            csv_path,
            http,
            stream,
            metrics_port,
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable has empty value.
    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),
    /// Environment variable has an unrecognized value.
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue {
        /// Variable name.
        key: String,
        /// Rejected value.
        value: String,
    },
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_duration_secs(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_secs)
}

fn parse_duration_millis(value: Option<String>, default: Duration) -> Duration {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map_or(default, Duration::from_millis)
}
