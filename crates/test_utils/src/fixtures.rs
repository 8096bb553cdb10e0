//! Pre-built Test Fixtures
//!
//! Amounts and dates shared by the test suites. Everything is in EUR unless
//! the name says otherwise.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Any EUR amount
    pub fn eur(amount: Decimal) -> Money {
        Money::new(amount, Currency::EUR)
    }

    pub fn eur_zero() -> Money {
        Money::zero(Currency::EUR)
    }

    pub fn eur_10() -> Money {
        Self::eur(dec!(10.00))
    }

    pub fn eur_100() -> Money {
        Self::eur(dec!(100.00))
    }

    /// Gross amount of a standard-rated invoice worth 100.00 net at 20%
    pub fn eur_120() -> Money {
        Self::eur(dec!(120.00))
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// First day of the catch-all TEST period
    pub fn test_period_start() -> NaiveDate {
        date(2000, 1, 1)
    }

    /// Last day of the catch-all TEST period
    pub fn test_period_end() -> NaiveDate {
        date(2100, 12, 31)
    }

    /// Default business date for postings
    pub fn business_date() -> NaiveDate {
        date(2025, 3, 15)
    }

    pub fn fy2025_start() -> NaiveDate {
        date(2025, 1, 1)
    }

    pub fn fy2025_end() -> NaiveDate {
        date(2025, 12, 31)
    }

    pub fn fy2026_start() -> NaiveDate {
        date(2026, 1, 1)
    }

    /// Instant the test clock starts at
    pub fn clock_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
    }
}

/// Shorthand for a valid calendar date
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}
