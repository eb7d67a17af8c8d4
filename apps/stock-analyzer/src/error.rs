//! Load errors shared by every stock price source.
//!
//! Every failure carries a [`LoadErrorKind`] label and a human-readable
//! message. Cancellation is never represented here: a cancelled load returns
//! whatever it gathered so far.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::stock_price::ParseError;

/// Failure kind, used for status display and metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadErrorKind {
    /// Source could not be opened or read.
    Io,
    /// A line did not parse into a record.
    Format,
    /// Remote provider request failed.
    Http,
}

impl LoadErrorKind {
    /// Get the kind label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Io => "io",
            Self::Format => "format",
            Self::Http => "http",
        }
    }
}

impl std::fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised while loading stock prices.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The source could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A line failed to parse.
    #[error("malformed record on line {line}: {source}")]
    Format {
        /// 1-based line number in the source.
        line: usize,
        /// Parser error.
        #[source]
        source: ParseError,
    },

    /// The remote provider failed or returned an error status.
    #[error("stock provider request failed: {message}")]
    Http {
        /// Error details.
        message: String,
    },
}

impl LoadError {
    /// Wrap an I/O error for `path`.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Wrap a parse error for the given 1-based line number.
    #[must_use]
    pub const fn format(line: usize, source: ParseError) -> Self {
        Self::Format { line, source }
    }

    /// Create an HTTP provider error.
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    /// Get the failure kind.
    #[must_use]
    pub const fn kind(&self) -> LoadErrorKind {
        match self {
            Self::Io { .. } => LoadErrorKind::Io,
            Self::Format { .. } => LoadErrorKind::Format,
            Self::Http { .. } => LoadErrorKind::Http,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels() {
        assert_eq!(LoadErrorKind::Io.as_str(), "io");
        assert_eq!(LoadErrorKind::Format.as_str(), "format");
        assert_eq!(LoadErrorKind::Http.as_str(), "http");
    }

    #[test]
    fn io_message_names_path() {
        let err = LoadError::io(
            "StockPrices_Small.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.kind(), LoadErrorKind::Io);
        assert_eq!(
            err.to_string(),
            "failed to read StockPrices_Small.csv: not found"
        );
    }

    #[test]
    fn format_message_names_line() {
        let err = LoadError::format(3, ParseError::EmptyIdentifier);
        assert_eq!(err.kind(), LoadErrorKind::Format);
        assert_eq!(
            err.to_string(),
            "malformed record on line 3: identifier is empty"
        );
    }

    #[test]
    fn http_message() {
        let err = LoadError::http("status 503");
        assert_eq!(err.kind(), LoadErrorKind::Http);
        assert!(err.to_string().contains("status 503"));
    }
}
