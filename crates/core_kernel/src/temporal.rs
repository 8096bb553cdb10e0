//! Business dates, time zones and clocks
//!
//! Ledger postings carry a business date (a `NaiveDate`) and a creation
//! timestamp. This module provides:
//! - [`Timezone`]: converts business dates to UTC instants for windowed queries
//! - [`DateRange`]: an inclusive range of business dates
//! - [`Clock`]: the injectable source of "now"

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::RwLock;
use thiserror::Error;

/// Timezone wrapper for ledger jurisdictions
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(s.to_string()))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Gets the first instant of the given local day as UTC
    ///
    /// When midnight does not exist locally (a DST gap), the earliest valid
    /// instant of that day is used.
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        let midnight = date.and_time(chrono::NaiveTime::MIN);
        let mut candidate = midnight;
        // A gap is at most a couple of hours; walk forward in 30 minute steps.
        for _ in 0..8 {
            if let Some(local) = candidate.and_local_timezone(self.0).earliest() {
                return Ok(local.with_timezone(&Utc));
            }
            candidate += Duration::minutes(30);
        }
        Err(TemporalError::UnrepresentableLocalTime {
            date,
            timezone: self.0.name().to_string(),
        })
    }

    /// Gets the last instant (23:59:59.999999999) of the given local day as UTC
    pub fn end_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, TemporalError> {
        let next = date
            .succ_opt()
            .ok_or_else(|| TemporalError::DateOutOfRange(date.to_string()))?;
        Ok(self.start_of_day(next)? - Duration::nanoseconds(1))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.name())
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid date range: start {start} must not be after end {end}")]
    InvalidRange {
        start: String,
        end: String,
    },

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Local time on {date} cannot be represented in {timezone}")]
    UnrepresentableLocalTime {
        date: NaiveDate,
        timezone: String,
    },

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),
}

/// An inclusive range of business dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TemporalError> {
        if start > end {
            return Err(TemporalError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Returns true if the two ranges share at least one day
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Converts to a `[first instant, last instant]` window in the given timezone
    pub fn to_window(&self, tz: &Timezone) -> Result<(DateTime<Utc>, DateTime<Utc>), TemporalError> {
        Ok((tz.start_of_day(self.start)?, tz.end_of_day(self.end)?))
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Moves the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.instant.write().unwrap_or_else(|p| p.into_inner());
        *guard = instant;
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        let mut guard = self.instant.write().unwrap_or_else(|p| p.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_contains_both_ends() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 12, 31)));
        assert!(!range.contains(date(2025, 1, 1)));
    }

    #[test]
    fn test_date_range_rejects_inverted_bounds() {
        assert!(matches!(
            DateRange::new(date(2024, 2, 1), date(2024, 1, 1)),
            Err(TemporalError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_date_range_overlap() {
        let q1 = DateRange::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        let q2 = DateRange::new(date(2024, 4, 1), date(2024, 6, 30)).unwrap();
        let straddle = DateRange::new(date(2024, 3, 31), date(2024, 4, 1)).unwrap();

        assert!(!q1.overlaps(&q2));
        assert!(q1.overlaps(&straddle));
        assert!(q2.overlaps(&straddle));
    }

    #[test]
    fn test_day_window_in_paris() {
        let tz: Timezone = "Europe/Paris".parse().unwrap();
        let start = tz.start_of_day(date(2024, 1, 15)).unwrap();
        let end = tz.end_of_day(date(2024, 1, 15)).unwrap();

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 14, 23, 0, 0).unwrap());
        assert_eq!(end - start, Duration::days(1) - Duration::nanoseconds(1));
    }

    #[test]
    fn test_unknown_timezone() {
        assert!(matches!(
            "Mars/Olympus".parse::<Timezone>(),
            Err(TemporalError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn test_fixed_clock_advances() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let clock = FixedClock::at(t0);
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), t0 + Duration::seconds(5));
    }
}
