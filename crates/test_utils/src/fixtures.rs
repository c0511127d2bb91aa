//! Pre-built Test Fixtures
//!
//! Ready-to-use test data. Every fixture is fixed so tests stay predictable.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, FixedClock, Money, Rate};
use domain_billing::LineItem;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    /// 10% sales tax
    pub fn ten_percent() -> Rate {
        Rate::from_percentage(dec!(10))
    }
}

/// Fixture for dates and instants
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
    }

    /// 09:00 UTC on the given day
    pub fn morning(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
            .single()
            .expect("valid fixture instant")
    }

    /// Monday 2024-01-01, the anchor most schedule tests start from
    pub fn new_year_2024() -> NaiveDate {
        Self::date(2024, 1, 1)
    }

    /// A clock frozen at 09:00 UTC on the given day
    pub fn clock_at(year: i32, month: u32, day: u32) -> FixedClock {
        FixedClock::new(Self::morning(year, month, day))
    }
}

/// Fixture for billing data
pub struct BillingFixtures;

impl BillingFixtures {
    /// Two lines totalling 200.00: 2 × 50 and 1 × 100
    pub fn standard_items() -> Vec<LineItem> {
        vec![
            LineItem::new("Design hours", dec!(2), dec!(50)),
            LineItem::new("Hosting", dec!(1), dec!(100)),
        ]
    }

    pub fn retainer_item() -> LineItem {
        LineItem::new("Monthly retainer", dec!(1), dec!(1500))
    }
}
