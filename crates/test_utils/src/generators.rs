//! Property-Based Test Generators
//!
//! Proptest strategies for generating schedule and billing inputs that
//! satisfy the domain's validation rules.

use chrono::NaiveDate;
use core_kernel::{Frequency, Rate, RecurrenceRule};
use domain_billing::LineItem;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Discounts from 0.00 to 500.00
pub fn discount_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..50_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Quantities from 0.01 to 1000.00
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Unit rates from 0.0000 to 10,000.0000
pub fn unit_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

/// Tax percentages from 0.00% to 100.00%
pub fn tax_rate_strategy() -> impl Strategy<Value = Rate> {
    (0i64..=10_000i64).prop_map(|n| Rate::from_percentage(Decimal::new(n, 2)))
}

pub fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    (quantity_strategy(), unit_rate_strategy())
        .prop_map(|(quantity, rate)| LineItem::new("Generated line", quantity, rate))
}

pub fn line_items_strategy() -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item_strategy(), 0..12)
}

/// Dates between 1990 and 2060
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    let start = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default();
    (0u64..25_567u64).prop_map(move |offset| {
        start
            .checked_add_days(chrono::Days::new(offset))
            .unwrap_or(start)
    })
}

pub fn frequency_strategy() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        Just(Frequency::Weekly),
        Just(Frequency::Monthly),
        Just(Frequency::Quarterly),
        Just(Frequency::Yearly),
        Just(Frequency::Custom),
    ]
}

/// Rules that pass validation
pub fn rule_strategy() -> impl Strategy<Value = RecurrenceRule> {
    (
        frequency_strategy(),
        1u32..12u32,
        prop::collection::btree_set(0u8..7u8, 0..4),
        prop::option::of(1u32..=31u32),
        1u32..90u32,
    )
        .prop_map(|(frequency, interval, days, day_of_month, custom_days)| {
            let mut rule = RecurrenceRule::new(frequency, interval);
            match frequency {
                Frequency::Weekly if !days.is_empty() => rule.days_of_week = Some(days),
                Frequency::Monthly | Frequency::Quarterly => rule.day_of_month = day_of_month,
                Frequency::Custom => rule.custom_days = Some(custom_days),
                _ => {}
            }
            rule
        })
}

/// Non-empty weekday sets
pub fn weekdays_strategy() -> impl Strategy<Value = BTreeSet<u8>> {
    prop::collection::btree_set(0u8..7u8, 1..7)
}
