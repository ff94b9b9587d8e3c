//! Date parsing and reporting windows.
//!
//! Dates are typed by users as `MM-DD-YYYY` (month and day may drop their
//! leading zero) or as eight bare digits `MMDDYYYY`. Internally every date is a
//! [`NaiveDate`] and is stored as `YYYY-MM-DD`.
//!
//! A fiscal year `Y` runs from March 1 of `Y` through February 28 of `Y + 1`,
//! both ends inclusive. February 29 is never part of the window's end, even in
//! leap years.
//!
//! # Example
//!
//! ```
//! use retire_core::period::{DateWindow, normalize_date};
//!
//! assert_eq!(normalize_date("03152025").unwrap(), "2025-03-15");
//!
//! let window = DateWindow::fiscal_year(2024).unwrap();
//! assert_eq!(window.start_iso(), "2024-03-01");
//! assert_eq!(window.end_iso(), "2025-02-28");
//! ```

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{DateRangeError, EngineError};

const ISO_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_FORMAT: &str = "%m-%d-%Y";

static DASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})-(\d{4})$").expect("valid date pattern"));
static COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})(\d{4})$").expect("valid date pattern"));

/// Parses a user-entered date in `MM-DD-YYYY` or `MMDDYYYY` form.
///
/// Surrounding whitespace is ignored.
///
/// # Errors
///
/// [`EngineError::InvalidDateFormat`] when the text matches neither shape or
/// names a day that does not exist (e.g. `02-30-2025`).
pub fn parse_display_date(input: &str) -> Result<NaiveDate, EngineError> {
    let invalid = || EngineError::InvalidDateFormat(input.to_string());
    let trimmed = input.trim();
    let captures = DASHED
        .captures(trimmed)
        .or_else(|| COMPACT.captures(trimmed))
        .ok_or_else(invalid)?;

    let field = |i: usize| captures[i].parse::<u32>().map_err(|_| invalid());
    let year = captures[3].parse::<i32>().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, field(1)?, field(2)?).ok_or_else(invalid)
}

/// Converts a user-entered date to the canonical `YYYY-MM-DD` form.
pub fn normalize_date(input: &str) -> Result<String, EngineError> {
    parse_display_date(input).map(iso_date)
}

/// `YYYY-MM-DD`
pub fn iso_date(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// `MM-DD-YYYY`
pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// An inclusive `[start, end]` span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateWindow {
    /// Builds a window, rejecting `start > end`.
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, EngineError> {
        if start > end {
            return Err(EngineError::InvalidDateRange(
                DateRangeError::StartAfterEnd { start, end },
            ));
        }
        Ok(Self { start, end })
    }

    /// `[Y-03-01, (Y+1)-02-28]`
    pub fn fiscal_year(year: i32) -> Result<Self, EngineError> {
        let start = NaiveDate::from_ymd_opt(year, 3, 1);
        let end = year
            .checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 2, 28));

        match (start, end) {
            (Some(start), Some(end)) => Ok(Self { start, end }),
            _ => Err(EngineError::invalid_value(format!(
                "fiscal year {year} is out of range"
            ))),
        }
    }

    /// Builds a window from two user-entered dates.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidDateRange`] with
    /// [`DateRangeError::BadFormat`] naming the offending input, or
    /// [`DateRangeError::StartAfterEnd`].
    pub fn from_display(
        start: &str,
        end: &str,
    ) -> Result<Self, EngineError> {
        let bad_format =
            |raw: &str| EngineError::InvalidDateRange(DateRangeError::BadFormat(raw.to_string()));

        let start = parse_display_date(start).map_err(|_| bad_format(start))?;
        let end = parse_display_date(end).map_err(|_| bad_format(end))?;

        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(
        &self,
        date: NaiveDate,
    ) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn start_iso(&self) -> String {
        iso_date(self.start)
    }

    pub fn end_iso(&self) -> String {
        iso_date(self.end)
    }
}

/// Human-readable name of a reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodLabel {
    FiscalYear(i32),
    Custom { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for PeriodLabel {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::FiscalYear(year) => write!(f, "Fiscal Year {year}"),
            Self::Custom { start, end } => {
                write!(f, "{} to {}", display_date(*start), display_date(*end))
            }
        }
    }
}

/// The window a summary covers, together with its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub label: PeriodLabel,
    pub window: DateWindow,
}

impl ReportingPeriod {
    pub fn fiscal_year(year: i32) -> Result<Self, EngineError> {
        Ok(Self {
            label: PeriodLabel::FiscalYear(year),
            window: DateWindow::fiscal_year(year)?,
        })
    }

    pub fn custom(window: DateWindow) -> Self {
        Self {
            label: PeriodLabel::Custom {
                start: window.start,
                end: window.end,
            },
            window,
        }
    }

    /// Uses the explicit `(start, end)` range when given, otherwise the fiscal
    /// window of `year`.
    pub fn resolve(
        year: i32,
        range: Option<(&str, &str)>,
    ) -> Result<Self, EngineError> {
        match range {
            Some((start, end)) => DateWindow::from_display(start, end).map(Self::custom),
            None => Self::fiscal_year(year),
        }
    }
}
