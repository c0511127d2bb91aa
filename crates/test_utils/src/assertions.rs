//! Custom Test Assertions
//!
//! Assertion helpers for domain types that give more meaningful failure
//! messages than a bare `assert_eq!`.

use chrono::{Datelike, NaiveDate};
use core_kernel::Money;
use domain_billing::{Billable, LineItem};
use rust_decimal::{Decimal, RoundingStrategy};

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts `amount == round2(quantity × rate)` for a line item
pub fn assert_line_amount(item: &LineItem) {
    let expected = (item.quantity * item.rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    assert_eq!(
        item.amount, expected,
        "Line '{}' amount {} does not match {} × {}",
        item.description, item.amount, item.quantity, item.rate
    );
}

/// Asserts that the stored totals of an aggregate agree with its line items
///
/// `subtotal` is the sum of the line amounts and `total` is
/// `subtotal + tax - discount`.
pub fn assert_totals_consistent<B: Billable>(aggregate: &B, subtotal: &Money, tax_amount: &Money, total: &Money) {
    let sum: Decimal = aggregate.line_items().iter().map(|item| item.amount).sum();
    assert_eq!(
        subtotal.amount(),
        sum,
        "Subtotal {} does not match the line amounts ({})",
        subtotal,
        sum
    );

    let expected = subtotal.amount() + tax_amount.amount() - aggregate.discount().amount();
    assert_eq!(
        total.amount(),
        expected,
        "Total {} does not equal subtotal {} + tax {} - discount {}",
        total,
        subtotal,
        tax_amount,
        aggregate.discount()
    );
}

/// Asserts that a sequence of dates is strictly increasing
pub fn assert_strictly_increasing(dates: &[NaiveDate]) {
    for pair in dates.windows(2) {
        assert!(
            pair[0] < pair[1],
            "Dates not strictly increasing: {} then {}",
            pair[0],
            pair[1]
        );
    }
}

/// Asserts that a date is the last day of its month
pub fn assert_month_end(date: NaiveDate) {
    let next = date.succ_opt().map(|d| d.month());
    assert!(
        next != Some(date.month()),
        "Expected {} to be the last day of its month",
        date
    );
}
