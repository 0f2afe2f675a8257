//! Date windows and bounds.
//!
//! `FetchWindow` is the strict window handed to the fetch engine: both bounds
//! must be real dates and invalid input is a configuration error.
//!
//! `DateBound` is the lenient bound used by collection filters. An unset
//! bound is a legitimate value, and text that does not parse as a date
//! becomes an unset bound instead of an error. Collection filters treat an
//! unset start as "do not filter", so a mistyped date yields the unfiltered
//! collection.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ConfigError, Result};

/// Parse a date in one of the accepted spellings.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD` and `M/D/YYYY`. Plain dates
/// resolve to midnight UTC.
#[must_use]
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Inclusive creation-time window for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
}

impl FetchWindow {
    /// Create a window.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidWindow` if `end` is before `start`.
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<Self> {
        if let Some(end) = end {
            if end < start {
                return Err(ConfigError::InvalidWindow {
                    start: start.to_rfc3339(),
                    end: end.to_rfc3339(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Create a window with no upper bound.
    #[must_use]
    pub const fn since(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    /// Parse both bounds strictly.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidDate` naming the first bound that does
    /// not parse, or `ConfigError::InvalidWindow` if the bounds are reversed.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_at = parse_date(start).ok_or_else(|| ConfigError::InvalidDate {
            field: "start",
            input: start.to_string(),
        })?;
        let end_at = parse_date(end).ok_or_else(|| ConfigError::InvalidDate {
            field: "end",
            input: end.to_string(),
        })?;
        Self::new(start_at, Some(end_at))
    }

    /// Window start.
    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Window end, `None` when unbounded.
    #[must_use]
    pub const fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Bounds as inclusive epoch seconds `(gte, lte)`.
    #[must_use]
    pub fn bounds(&self) -> (i64, Option<i64>) {
        (self.start.timestamp(), self.end.map(|end| end.timestamp()))
    }
}

impl fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{} - {}]", self.start.to_rfc3339(), end.to_rfc3339()),
            None => write!(f, "[{} - ..]", self.start.to_rfc3339()),
        }
    }
}

/// Optional date bound for collection filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateBound(Option<DateTime<Utc>>);

impl DateBound {
    /// A bound that is not set.
    pub const UNSET: Self = Self(None);

    /// A bound at the given instant.
    #[must_use]
    pub const fn at(instant: DateTime<Utc>) -> Self {
        Self(Some(instant))
    }

    /// Parse a bound, falling back to an unset bound on invalid input.
    #[must_use]
    pub fn parse_lenient(input: &str) -> Self {
        let parsed = parse_date(input);
        if parsed.is_none() {
            tracing::warn!(input = %input, "Ignoring date bound that is not a date");
        }
        Self(parsed)
    }

    /// The bound instant, if set.
    #[must_use]
    pub const fn get(&self) -> Option<DateTime<Utc>> {
        self.0
    }

    /// Whether the bound is set.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Bound as epoch seconds.
    #[must_use]
    pub fn epoch_seconds(&self) -> Option<i64> {
        self.0.map(|instant| instant.timestamp())
    }
}

impl From<DateTime<Utc>> for DateBound {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::at(instant)
    }
}

impl From<Option<DateTime<Utc>>> for DateBound {
    fn from(instant: Option<DateTime<Utc>>) -> Self {
        Self(instant)
    }
}

impl From<NaiveDate> for DateBound {
    fn from(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc()))
    }
}
