//! Stock Price Records
//!
//! The value type every loader produces, plus the parser for one line of
//! comma-separated text.
//!
//! # Line Layouts
//!
//! Two layouts are accepted:
//!
//! - **Short**: `identifier,change`
//! - **Full**: `identifier,trade_date,open,high,low,close,volume,change,change_percent`
//!
//! Fields are trimmed of whitespace and of `'`/`"` quoting. Numbers always
//! use `.` as the decimal point.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade date format used by the CSV fixture (`1/2/2019 12:00:00 AM`).
const TRADE_DATE_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Quote characters stripped from every field.
const QUOTE_CHARS: [char; 2] = ['\'', '"'];

// =============================================================================
// Types
// =============================================================================

/// One observed price point for a ticker.
///
/// Only `identifier` and `change` are guaranteed. The remaining columns are
/// present when the record came from the full CSV layout or the HTTP
/// provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockPrice {
    /// Ticker symbol (e.g. `"MSFT"`).
    pub identifier: String,
    /// Signed price delta.
    pub change: Decimal,
    /// Trading session timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trade_date: Option<NaiveDateTime>,
    /// Opening price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,
    /// Session high.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,
    /// Session low.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,
    /// Closing price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<Decimal>,
    /// Shares traded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
    /// Change as a percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,
}

impl StockPrice {
    /// Create a record carrying only the required fields.
    #[must_use]
    pub fn new(identifier: impl Into<String>, change: Decimal) -> Self {
        Self {
            identifier: identifier.into(),
            change,
            trade_date: None,
            open: None,
            high: None,
            low: None,
            close: None,
            volume: None,
            change_percent: None,
        }
    }

    /// Set the change percentage.
    #[must_use]
    pub fn with_change_percent(mut self, change_percent: Decimal) -> Self {
        self.change_percent = Some(change_percent);
        self
    }

    /// Parse one comma-separated line.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if the field count matches neither layout,
    /// the identifier is empty, or a numeric or date field does not parse.
    pub fn from_csv(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split(',').map(clean_field).collect();

        match fields.as_slice() {
            [identifier, change] => Ok(Self::new(
                parse_identifier(identifier)?,
                parse_decimal("change", change)?,
            )),
            [
                identifier,
                trade_date,
                open,
                high,
                low,
                close,
                volume,
                change,
                change_percent,
            ] => Ok(Self {
                identifier: parse_identifier(identifier)?,
                change: parse_decimal("change", change)?,
                trade_date: Some(parse_trade_date(trade_date)?),
                open: Some(parse_decimal("open", open)?),
                high: Some(parse_decimal("high", high)?),
                low: Some(parse_decimal("low", low)?),
                close: Some(parse_decimal("close", close)?),
                volume: Some(parse_volume(volume)?),
                change_percent: Some(parse_decimal("change_percent", change_percent)?),
            }),
            other => Err(ParseError::FieldCount { found: other.len() }),
        }
    }

    /// Check whether this record belongs to `identifier`.
    #[must_use]
    pub fn is_for(&self, identifier: &str) -> bool {
        self.identifier == identifier
    }
}

impl FromStr for StockPrice {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_csv(s)
    }
}

/// Error parsing a single CSV line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Field count matches neither the short nor the full layout.
    #[error("expected 2 or 9 fields, found {found}")]
    FieldCount {
        /// Number of fields on the line.
        found: usize,
    },

    /// Identifier field is blank.
    #[error("identifier is empty")]
    EmptyIdentifier,

    /// A numeric or date field failed to parse.
    #[error("invalid {field} value {value:?}")]
    InvalidField {
        /// Name of the offending column.
        field: &'static str,
        /// Raw field text.
        value: String,
    },
}

// =============================================================================
// Field Parsing
// =============================================================================

fn clean_field(raw: &str) -> &str {
    raw.trim().trim_matches(QUOTE_CHARS.as_slice())
}

fn parse_identifier(raw: &str) -> Result<String, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::EmptyIdentifier);
    }
    Ok(raw.to_string())
}

fn parse_decimal(field: &'static str, raw: &str) -> Result<Decimal, ParseError> {
    Decimal::from_str(raw).map_err(|_| invalid(field, raw))
}

fn parse_volume(raw: &str) -> Result<u64, ParseError> {
    raw.parse().map_err(|_| invalid("volume", raw))
}

fn parse_trade_date(raw: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(raw, TRADE_DATE_FORMAT).map_err(|_| invalid("trade_date", raw))
}

fn invalid(field: &'static str, raw: &str) -> ParseError {
    ParseError::InvalidField {
        field,
        value: raw.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
