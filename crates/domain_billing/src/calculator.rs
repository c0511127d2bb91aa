//! Invoice total calculation
//!
//! Both concrete invoices and recurring invoice templates carry line items,
//! a tax rate and a flat discount. [`LineItemCalculator`] keeps their derived
//! money fields consistent:
//!
//! - `amount = round2(quantity * rate)` per line
//! - `subtotal = Σ amount`
//! - `tax_amount = subtotal * tax_rate / 100`, rounded to the currency
//! - `total = subtotal + tax_amount - discount`
//!
//! The total is not clamped at zero: a discount larger than subtotal plus tax
//! yields a negative total.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, Rate};

use crate::line_item::LineItem;

/// Derived money fields of an invoice-like aggregate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
}

impl InvoiceTotals {
    pub fn zero(currency: Currency) -> Self {
        Self {
            subtotal: Money::zero(currency),
            tax_amount: Money::zero(currency),
            total: Money::zero(currency),
        }
    }
}

/// An aggregate whose totals derive from its line items
pub trait Billable {
    fn currency(&self) -> Currency;
    fn line_items(&self) -> &[LineItem];
    fn line_items_mut(&mut self) -> &mut [LineItem];
    fn tax_rate(&self) -> Rate;
    fn discount(&self) -> Money;
    fn apply_totals(&mut self, totals: InvoiceTotals);
}

/// Stateless calculator for line amounts and aggregate totals
pub struct LineItemCalculator;

impl LineItemCalculator {
    /// Sets `item.amount` to `quantity * rate` rounded to two places
    ///
    /// Zero or negative quantities are computed as given, not rejected.
    /// Products beyond `Decimal`'s range saturate; template validation keeps
    /// real input well inside it.
    pub fn recompute_amount(item: &mut LineItem) {
        item.amount = round2(item.quantity.saturating_mul(item.rate));
    }

    /// Computes totals for a set of lines
    pub fn totals(items: &[LineItem], tax_rate: Rate, discount: Money, currency: Currency) -> InvoiceTotals {
        let subtotal = Money::new(
            items
                .iter()
                .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.amount)),
            currency,
        );
        let tax_amount = tax_rate.apply(&subtotal).round_to_currency();
        let total = Money::new(
            subtotal
                .amount()
                .saturating_add(tax_amount.amount())
                .saturating_sub(discount.amount()),
            currency,
        );

        InvoiceTotals {
            subtotal,
            tax_amount,
            total,
        }
    }

    /// Recomputes every line amount and the aggregate totals in place
    pub fn recompute_totals<B: Billable>(aggregate: &mut B) {
        for item in aggregate.line_items_mut() {
            Self::recompute_amount(item);
        }
        let totals = Self::totals(
            aggregate.line_items(),
            aggregate.tax_rate(),
            aggregate.discount(),
            aggregate.currency(),
        );
        aggregate.apply_totals(totals);
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
