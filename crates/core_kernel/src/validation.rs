//! Input validation
//!
//! The dashboard forms reject most bad input before it reaches the domain,
//! but templates can also arrive from storage or imports. Validators collect
//! every violation instead of stopping at the first one so the caller can
//! report them together.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::recurrence::{Frequency, RecurrenceRule};
use crate::temporal::DateRange;

/// A single failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Field path, e.g. `lineItems[2].quantity`
    pub field: String,
    pub message: String,
}

/// Every violation found on one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Adds a violation when `condition` is false
    pub fn check(&mut self, condition: bool, field: impl Into<String>, message: impl Into<String>) {
        if !condition {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// True if any violation concerns the given field
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    /// `Ok(())` when nothing was recorded
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.field, v.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Checks a recurrence rule against the ranges the forms enforce
pub fn validate_rule(rule: &RecurrenceRule, errors: &mut ValidationErrors) {
    errors.check(rule.interval >= 1, "interval", "must be at least 1");

    if let Some(days) = &rule.days_of_week {
        errors.check(
            days.iter().all(|d| *d <= 6),
            "daysOfWeek",
            "weekdays must be between 0 (Sunday) and 6 (Saturday)",
        );
        errors.check(
            rule.frequency == Frequency::Weekly || days.is_empty(),
            "daysOfWeek",
            "only applies to weekly schedules",
        );
    }

    if let Some(day) = rule.day_of_month {
        errors.check((1..=31).contains(&day), "dayOfMonth", "must be between 1 and 31");
        errors.check(
            matches!(rule.frequency, Frequency::Monthly | Frequency::Quarterly),
            "dayOfMonth",
            "only applies to monthly schedules",
        );
    }

    if rule.frequency == Frequency::Custom {
        errors.check(
            rule.custom_days.is_some_and(|d| d >= 1),
            "customDays",
            "custom schedules need at least 1 day",
        );
    }
}

/// Checks that an end date, if any, does not precede the start date
pub fn validate_window(window: &DateRange, errors: &mut ValidationErrors) {
    if let Some(end) = window.end {
        errors.check(end >= window.start, "endDate", "must not be before the start date");
    }
}
