//! Recurrence rules and next-occurrence calculation
//!
//! A [`RecurrenceRule`] describes how often a recurring task or invoice
//! template fires. [`next_occurrence`] turns an anchor date (normally the
//! template's current next-due date) into the following occurrence. The
//! calculation is pure: it never reads the clock and the same inputs always
//! give the same date.
//!
//! # Rules
//!
//! | Frequency   | Next occurrence                                                 |
//! |-------------|-----------------------------------------------------------------|
//! | `daily`     | anchor + interval days                                          |
//! | `weekly`    | next listed weekday within `interval` weeks, else + interval weeks |
//! | `monthly`   | anchor + interval months, day clamped to month length           |
//! | `quarterly` | anchor + 3 × interval months, day clamped to month length       |
//! | `yearly`    | anchor + interval years (Feb 29 falls back to Feb 28)           |
//! | `custom`    | anchor + custom days                                            |

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// How often a template recurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Fixed number of days, see [`RecurrenceRule::custom_days`]
    Custom,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Yearly => "yearly",
            Frequency::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Errors raised by recurrence arithmetic
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    #[error("Next {frequency} occurrence after {anchor} is outside the supported date range")]
    OutOfRange { anchor: NaiveDate, frequency: Frequency },
}

/// A recurrence rule
///
/// Weekdays are numbered 0 (Sunday) through 6 (Saturday), the numbering the
/// dashboard's JSON payloads use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Weekly only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<BTreeSet<u8>>,
    /// Monthly and quarterly only, 1..=31
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// Custom only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency, interval: u32) -> Self {
        Self {
            frequency,
            interval,
            days_of_week: None,
            day_of_month: None,
            custom_days: None,
        }
    }

    pub fn daily(interval: u32) -> Self {
        Self::new(Frequency::Daily, interval)
    }

    pub fn weekly(interval: u32) -> Self {
        Self::new(Frequency::Weekly, interval)
    }

    pub fn monthly(interval: u32) -> Self {
        Self::new(Frequency::Monthly, interval)
    }

    pub fn yearly(interval: u32) -> Self {
        Self::new(Frequency::Yearly, interval)
    }

    /// Every `days` days
    pub fn custom(days: u32) -> Self {
        Self {
            custom_days: Some(days),
            ..Self::new(Frequency::Custom, 1)
        }
    }

    pub fn on_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.days_of_week = Some(days.into_iter().collect());
        self
    }

    pub fn on_day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    /// The interval actually used for arithmetic; zero behaves as one so a
    /// malformed rule can never produce the anchor date again.
    fn step(&self) -> u32 {
        self.interval.max(1)
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.step();
        match self.frequency {
            Frequency::Daily if n == 1 => write!(f, "Daily")?,
            Frequency::Daily => write!(f, "Every {} days", n)?,
            Frequency::Weekly if n == 1 => write!(f, "Weekly")?,
            Frequency::Weekly => write!(f, "Every {} weeks", n)?,
            Frequency::Monthly if n == 1 => write!(f, "Monthly")?,
            Frequency::Monthly => write!(f, "Every {} months", n)?,
            Frequency::Quarterly if n == 1 => write!(f, "Quarterly")?,
            Frequency::Quarterly => write!(f, "Every {} quarters", n)?,
            Frequency::Yearly if n == 1 => write!(f, "Yearly")?,
            Frequency::Yearly => write!(f, "Every {} years", n)?,
            Frequency::Custom => write!(f, "Every {} days", self.custom_days.unwrap_or(n))?,
        }

        match self.frequency {
            Frequency::Weekly => {
                if let Some(days) = self.days_of_week.as_ref().filter(|d| !d.is_empty()) {
                    let names: Vec<&str> = days.iter().filter_map(|d| weekday_name(*d)).collect();
                    write!(f, " on {}", names.join(", "))?;
                }
            }
            Frequency::Monthly | Frequency::Quarterly => {
                if let Some(day) = self.day_of_month {
                    write!(f, " on day {}", day)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

fn weekday_name(day: u8) -> Option<&'static str> {
    const NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    NAMES.get(day as usize).copied()
}

/// Switches that change how rules are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceOptions {
    /// When false, weekly rules ignore `days_of_week` and step whole weeks
    pub honor_days_of_week: bool,
}

impl Default for RecurrenceOptions {
    fn default() -> Self {
        Self {
            honor_days_of_week: true,
        }
    }
}

/// Computes the occurrence that follows `anchor`
///
/// # Errors
///
/// Returns [`RecurrenceError::OutOfRange`] only when the result would fall
/// outside chrono's representable dates.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use core_kernel::recurrence::{next_occurrence, RecurrenceOptions, RecurrenceRule};
///
/// let anchor = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// let next = next_occurrence(anchor, &RecurrenceRule::monthly(2), RecurrenceOptions::default()).unwrap();
/// assert_eq!(next, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
/// ```
pub fn next_occurrence(
    anchor: NaiveDate,
    rule: &RecurrenceRule,
    options: RecurrenceOptions,
) -> Result<NaiveDate, RecurrenceError> {
    let out_of_range = || RecurrenceError::OutOfRange {
        anchor,
        frequency: rule.frequency,
    };
    let step = rule.step();

    let next = match rule.frequency {
        Frequency::Daily => add_days(anchor, u64::from(step)),
        Frequency::Weekly => {
            let horizon = 7 * u64::from(step);
            let days = rule
                .days_of_week
                .as_ref()
                .filter(|days| options.honor_days_of_week && !days.is_empty());
            match days {
                Some(days) => next_listed_weekday(anchor, days, horizon)
                    .or_else(|| add_days(anchor, horizon)),
                None => add_days(anchor, horizon),
            }
        }
        Frequency::Monthly => add_months(anchor, step, rule.day_of_month),
        Frequency::Quarterly => step
            .checked_mul(3)
            .and_then(|months| add_months(anchor, months, rule.day_of_month)),
        Frequency::Yearly => step
            .checked_mul(12)
            .and_then(|months| add_months(anchor, months, None)),
        Frequency::Custom => {
            let days = rule.custom_days.unwrap_or(step).max(1);
            add_days(anchor, u64::from(days))
        }
    };

    next.ok_or_else(out_of_range)
}

/// Lists the next `count` occurrences after `anchor`, in order
pub fn upcoming(
    anchor: NaiveDate,
    rule: &RecurrenceRule,
    options: RecurrenceOptions,
    count: usize,
) -> Result<Vec<NaiveDate>, RecurrenceError> {
    let mut dates = Vec::with_capacity(count);
    let mut cursor = anchor;
    for _ in 0..count {
        cursor = next_occurrence(cursor, rule, options)?;
        dates.push(cursor);
    }
    Ok(dates)
}

fn add_days(date: NaiveDate, days: u64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(days))
}

/// First date strictly after `anchor`, at most `horizon` days out, whose
/// weekday is listed
fn next_listed_weekday(anchor: NaiveDate, days: &BTreeSet<u8>, horizon: u64) -> Option<NaiveDate> {
    (1..=horizon)
        .map_while(|offset| add_days(anchor, offset))
        .find(|candidate| {
            let weekday = candidate.weekday().num_days_from_sunday() as u8;
            days.contains(&weekday)
        })
}

/// Shifts by whole months. The day is `day_of_month` when given, otherwise
/// the anchor's day, and is clamped to the target month's length.
fn add_months(anchor: NaiveDate, months: u32, day_of_month: Option<u32>) -> Option<NaiveDate> {
    let shifted = anchor.checked_add_months(Months::new(months))?;
    match day_of_month {
        Some(day) => {
            let last = last_day_of_month(shifted.year(), shifted.month())?;
            shifted.with_day(day.clamp(1, last))
        }
        None => Some(shifted),
    }
}

/// Number of days in the given month
pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
        .map(|d| d.day())
}

/// A template that periodically produces concrete instances
///
/// Recurring tasks and recurring invoice templates both implement this so a
/// single materializer can drive either.
pub trait Recurring {
    /// The concrete record produced for each occurrence
    type Instance;

    fn is_active(&self) -> bool;

    /// The next occurrence that has not yet been materialized
    fn next_due(&self) -> NaiveDate;

    fn end_date(&self) -> Option<NaiveDate>;

    fn recurrence_rule(&self) -> RecurrenceRule;

    /// Snapshots the template into a new instance for `occurrence`
    fn instantiate(&self, occurrence: NaiveDate, now: DateTime<Utc>) -> Self::Instance;

    /// Advances the next-due pointer after an instance was generated
    fn record_generation(&mut self, next_due: NaiveDate, generated_at: DateTime<Utc>);

    fn deactivate(&mut self, at: DateTime<Utc>);
}
