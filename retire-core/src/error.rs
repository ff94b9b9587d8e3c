use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the calculation engine.
///
/// Every variant is recoverable: the operation that produced it made no
/// changes to its inputs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A date string did not match `MM-DD-YYYY` or `MMDDYYYY`, or named an
    /// impossible calendar day.
    #[error("invalid date '{0}' (use MM-DD-YYYY)")]
    InvalidDateFormat(String),

    /// A start/end pair could not be turned into a window.
    #[error("invalid date range: {0}")]
    InvalidDateRange(DateRangeError),

    /// A negative amount, percentage or profit, a missing required field, or
    /// an amount too large to calculate with.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Why a date range was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("invalid date format '{0}' (use MM-DD-YYYY)")]
    BadFormat(String),

    #[error("start date {start} must be before end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },
}

impl EngineError {
    pub(crate) fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue(message.into())
    }

    /// A result that does not fit in a `Decimal`.
    pub(crate) fn out_of_range(what: &str) -> Self {
        Self::InvalidValue(format!("{what} is out of range"))
    }
}
