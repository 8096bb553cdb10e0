//! Unit tests for the Temporal module
//!
//! Tests cover DateRange, Timezone day windows and the injectable clocks.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use core_kernel::temporal::{Clock, DateRange, FixedClock, SystemClock, TemporalError, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod date_range {
    use super::*;

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(date(2024, 5, 1), date(2024, 5, 1)).unwrap();
        assert!(range.contains(date(2024, 5, 1)));
        assert!(!range.contains(date(2024, 5, 2)));
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let jan = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let feb = DateRange::new(date(2024, 2, 1), date(2024, 2, 29)).unwrap();
        assert!(!jan.overlaps(&feb));
        assert!(!feb.overlaps(&jan));
    }

    #[test]
    fn test_enclosing_range_overlaps() {
        let year = DateRange::new(date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        let march = DateRange::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        assert!(year.overlaps(&march));
        assert!(march.overlaps(&year));
    }

    #[test]
    fn test_display() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 3, 31)).unwrap();
        assert_eq!(range.to_string(), "2024-01-01..2024-03-31");
    }

    #[test]
    fn test_window_in_utc() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let (from, to) = range.to_window(&Timezone::default()).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            to,
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap() - Duration::nanoseconds(1)
        );
    }
}

mod timezone {
    use super::*;

    #[test]
    fn test_dst_transition_day_is_short() {
        let tz: Timezone = "Europe/Paris".parse().unwrap();
        let start = tz.start_of_day(date(2024, 3, 31)).unwrap();
        let end = tz.end_of_day(date(2024, 3, 31)).unwrap();
        assert_eq!(end - start, Duration::hours(23) - Duration::nanoseconds(1));
    }

    #[test]
    fn test_midnight_gap_uses_first_valid_instant() {
        // Santiago skipped 2023-09-03 00:00..01:00 local time.
        let tz: Timezone = "America/Santiago".parse().unwrap();
        let start = tz.start_of_day(date(2023, 9, 3)).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 9, 3, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_serde_uses_iana_name() {
        let tz: Timezone = "Europe/Paris".parse().unwrap();
        assert_eq!(serde_json::to_string(&tz).unwrap(), "\"Europe/Paris\"");
        let err = serde_json::from_str::<Timezone>("\"Nowhere/City\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_unknown_name_error() {
        assert_eq!(
            "Nowhere/City".parse::<Timezone>(),
            Err(TemporalError::UnknownTimezone("Nowhere/City".to_string()))
        );
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let later = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
