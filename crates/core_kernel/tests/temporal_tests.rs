//! Unit tests for calendar helpers and clocks

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use core_kernel::temporal::{Clock, DateRange, FixedClock, SystemClock, TemporalError, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod date_range {
    use super::*;

    #[test]
    fn test_new_rejects_end_before_start() {
        let result = DateRange::new(date(2024, 2, 1), Some(date(2024, 1, 31)));
        assert_eq!(
            result,
            Err(TemporalError::InvalidRange { start: date(2024, 2, 1), end: date(2024, 1, 31) })
        );
    }

    #[test]
    fn test_single_day_range_is_valid() {
        let range = DateRange::new(date(2024, 1, 1), Some(date(2024, 1, 1))).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(!range.contains(date(2024, 1, 2)));
    }

    #[test]
    fn test_open_range_contains_everything_after_start() {
        let range = DateRange::open(date(2024, 1, 1));
        assert!(range.contains(date(2099, 12, 31)));
        assert!(!range.contains(date(2023, 12, 31)));
        assert!(!range.has_ended_by(date(2099, 12, 31)));
    }

    #[test]
    fn test_has_ended_by_is_exclusive_of_end() {
        let range = DateRange::new(date(2024, 1, 1), Some(date(2024, 6, 30))).unwrap();
        assert!(!range.has_ended_by(date(2024, 6, 30)));
        assert!(range.has_ended_by(date(2024, 7, 1)));
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_returns_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_fixed_clock_clones_share_time() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let other = clock.clone();

        clock.advance(Duration::days(7));
        assert_eq!(other.today(Timezone::default()), date(2024, 1, 8));

        other.set(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(clock.today(Timezone::default()), date(2025, 3, 1));
    }

    #[test]
    fn test_today_respects_timezone() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap());
        let tokyo: Timezone = "Asia/Tokyo".parse().unwrap();
        assert_eq!(clock.today(tokyo), date(2024, 3, 2));
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}

mod timezone_serde {
    use super::*;

    #[test]
    fn test_roundtrip_by_name() {
        let tz: Timezone = "Europe/London".parse().unwrap();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Europe/London\"");
        assert_eq!(serde_json::from_str::<Timezone>(&json).unwrap(), tz);
    }

    #[test]
    fn test_rejects_unknown_name() {
        assert!(serde_json::from_str::<Timezone>("\"Not/AZone\"").is_err());
    }
}
