//! Tests for next-occurrence calculation
//!
//! Covers every frequency, the weekly weekday scan, month-end clamping and the
//! algebraic properties the materializer relies on.

use chrono::{Datelike, NaiveDate, Weekday};
use core_kernel::recurrence::{
    next_occurrence, upcoming, Frequency, RecurrenceOptions, RecurrenceRule,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn next(anchor: NaiveDate, rule: &RecurrenceRule) -> NaiveDate {
    next_occurrence(anchor, rule, RecurrenceOptions::default()).unwrap()
}

mod simple_frequencies {
    use super::*;

    #[test]
    fn test_daily_adds_interval_days() {
        assert_eq!(next(date(2024, 2, 28), &RecurrenceRule::daily(1)), date(2024, 2, 29));
        assert_eq!(next(date(2024, 12, 30), &RecurrenceRule::daily(3)), date(2025, 1, 2));
    }

    #[test]
    fn test_weekly_without_days_adds_weeks() {
        assert_eq!(next(date(2024, 1, 1), &RecurrenceRule::weekly(1)), date(2024, 1, 8));
        assert_eq!(next(date(2024, 1, 1), &RecurrenceRule::weekly(2)), date(2024, 1, 15));
    }

    #[test]
    fn test_monthly_two_months() {
        assert_eq!(next(date(2024, 1, 15), &RecurrenceRule::monthly(2)), date(2024, 3, 15));
    }

    #[test]
    fn test_quarterly_adds_three_months() {
        let rule = RecurrenceRule::new(Frequency::Quarterly, 1);
        assert_eq!(next(date(2024, 11, 30), &rule), date(2025, 2, 28));
    }

    #[test]
    fn test_yearly_from_leap_day() {
        assert_eq!(next(date(2024, 2, 29), &RecurrenceRule::yearly(1)), date(2025, 2, 28));
        assert_eq!(next(date(2024, 2, 29), &RecurrenceRule::yearly(4)), date(2028, 2, 29));
    }

    #[test]
    fn test_custom_days() {
        assert_eq!(next(date(2024, 1, 1), &RecurrenceRule::custom(45)), date(2024, 2, 15));
    }

    #[test]
    fn test_custom_without_days_falls_back_to_interval() {
        let rule = RecurrenceRule::new(Frequency::Custom, 10);
        assert_eq!(next(date(2024, 1, 1), &rule), date(2024, 1, 11));
    }
}

mod month_end {
    use super::*;

    #[test]
    fn test_jan_31_clamps_to_feb_29_in_leap_year() {
        let rule = RecurrenceRule::monthly(1).on_day_of_month(31);
        assert_eq!(next(date(2024, 1, 31), &rule), date(2024, 2, 29));
    }

    #[test]
    fn test_jan_31_clamps_to_feb_28_in_common_year() {
        let rule = RecurrenceRule::monthly(1).on_day_of_month(31);
        assert_eq!(next(date(2023, 1, 31), &rule), date(2023, 2, 28));
    }

    #[test]
    fn test_day_of_month_restores_after_short_month() {
        let rule = RecurrenceRule::monthly(1).on_day_of_month(31);
        let dates = upcoming(date(2024, 1, 31), &rule, RecurrenceOptions::default(), 3).unwrap();
        assert_eq!(dates, vec![date(2024, 2, 29), date(2024, 3, 31), date(2024, 4, 30)]);
    }

    #[test]
    fn test_without_day_of_month_the_clamp_sticks() {
        let rule = RecurrenceRule::monthly(1);
        let dates = upcoming(date(2024, 1, 31), &rule, RecurrenceOptions::default(), 2).unwrap();
        assert_eq!(dates, vec![date(2024, 2, 29), date(2024, 3, 29)]);
    }

    #[test]
    fn test_day_of_month_moves_anchor_day() {
        let rule = RecurrenceRule::monthly(1).on_day_of_month(1);
        assert_eq!(next(date(2024, 1, 15), &rule), date(2024, 2, 1));
    }
}

mod weekdays {
    use super::*;

    // 2024-01-01 is a Monday.

    #[test]
    fn test_picks_next_listed_weekday() {
        let rule = RecurrenceRule::weekly(1).on_days([1, 3, 5]);
        assert_eq!(next(date(2024, 1, 1), &rule), date(2024, 1, 3));
        assert_eq!(next(date(2024, 1, 3), &rule), date(2024, 1, 5));
        assert_eq!(next(date(2024, 1, 5), &rule), date(2024, 1, 8));
    }

    #[test]
    fn test_same_weekday_is_strictly_after() {
        let rule = RecurrenceRule::weekly(1).on_days([1]);
        assert_eq!(next(date(2024, 1, 1), &rule), date(2024, 1, 8));
    }

    #[test]
    fn test_sunday_is_zero() {
        let rule = RecurrenceRule::weekly(1).on_days([0]);
        let sunday = next(date(2024, 1, 1), &rule);
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(sunday, date(2024, 1, 7));
    }

    #[test]
    fn test_empty_set_steps_whole_weeks() {
        let rule = RecurrenceRule::weekly(1).on_days([]);
        assert_eq!(next(date(2024, 1, 1), &rule), date(2024, 1, 8));
    }

    #[test]
    fn test_out_of_range_days_fall_back_to_interval() {
        let rule = RecurrenceRule::weekly(2).on_days([9]);
        assert_eq!(next(date(2024, 1, 1), &rule), date(2024, 1, 15));
    }

    #[test]
    fn test_disabled_option_ignores_days() {
        let rule = RecurrenceRule::weekly(1).on_days([3]);
        let options = RecurrenceOptions { honor_days_of_week: false };
        assert_eq!(next_occurrence(date(2024, 1, 1), &rule, options).unwrap(), date(2024, 1, 8));
    }

    #[test]
    fn test_days_ignored_for_non_weekly_rules() {
        let rule = RecurrenceRule::daily(2).on_days([3]);
        assert_eq!(next(date(2024, 1, 1), &rule), date(2024, 1, 3));
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_rule_from_dashboard_json() {
        let rule: RecurrenceRule = serde_json::from_str(
            r#"{"frequency":"weekly","interval":2,"daysOfWeek":[1,4]}"#,
        )
        .unwrap();

        assert_eq!(rule.frequency, Frequency::Weekly);
        assert_eq!(rule.interval, 2);
        assert_eq!(rule.days_of_week, Some(BTreeSet::from([1u8, 4])));
        assert_eq!(rule.day_of_month, None);
    }

    #[test]
    fn test_interval_defaults_to_one() {
        let rule: RecurrenceRule = serde_json::from_str(r#"{"frequency":"monthly"}"#).unwrap();
        assert_eq!(rule.interval, 1);
    }
}

fn frequency_strategy() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        Just(Frequency::Weekly),
        Just(Frequency::Monthly),
        Just(Frequency::Quarterly),
        Just(Frequency::Yearly),
        Just(Frequency::Custom),
    ]
}

fn anchor_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..20_000).prop_map(|offset| date(2000, 1, 1) + chrono::Duration::days(offset))
}

proptest! {
    #[test]
    fn next_occurrence_is_deterministic(
        anchor in anchor_strategy(),
        frequency in frequency_strategy(),
        interval in 1u32..24,
    ) {
        let rule = RecurrenceRule::new(frequency, interval);
        let options = RecurrenceOptions::default();
        prop_assert_eq!(
            next_occurrence(anchor, &rule, options).unwrap(),
            next_occurrence(anchor, &rule, options).unwrap()
        );
    }

    #[test]
    fn next_occurrence_is_strictly_after_anchor(
        anchor in anchor_strategy(),
        frequency in frequency_strategy(),
        interval in 0u32..24,
        days in proptest::collection::btree_set(0u8..7, 0..7),
        day_of_month in proptest::option::of(1u32..=31),
    ) {
        let mut rule = RecurrenceRule::new(frequency, interval);
        rule.days_of_week = Some(days);
        rule.day_of_month = day_of_month;
        let next = next_occurrence(anchor, &rule, RecurrenceOptions::default()).unwrap();
        prop_assert!(next > anchor);
    }

    #[test]
    fn monthly_day_never_exceeds_requested_day(
        anchor in anchor_strategy(),
        day_of_month in 1u32..=31,
    ) {
        let rule = RecurrenceRule::monthly(1).on_day_of_month(day_of_month);
        let next = next_occurrence(anchor, &rule, RecurrenceOptions::default()).unwrap();
        prop_assert!(next.day() <= day_of_month);
    }
}
