//! Invoice line items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{LineItemId, TaskId};

use crate::calculator::LineItemCalculator;

/// Largest quantity accepted on a template line
pub const MAX_LINE_QUANTITY: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Largest unit rate accepted on a template line
pub const MAX_LINE_RATE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// A billable line on an invoice or invoice template
///
/// `amount` always equals `quantity * rate` rounded to two places; every
/// mutator below recomputes it. The optional `discount` and `tax` are shown on
/// the invoice for reference and do not feed the aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
    /// Task this line bills for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        let mut item = Self {
            id: LineItemId::new_v7(),
            description: description.into(),
            quantity,
            rate,
            amount: Decimal::ZERO,
            task_id: None,
            discount: None,
            tax: None,
        };
        LineItemCalculator::recompute_amount(&mut item);
        item
    }

    pub fn for_task(mut self, task_id: TaskId) -> Self {
        self.task_id = Some(task_id);
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_tax(mut self, tax: Decimal) -> Self {
        self.tax = Some(tax);
        self
    }

    pub fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
        LineItemCalculator::recompute_amount(self);
    }

    pub fn set_rate(&mut self, rate: Decimal) {
        self.rate = rate;
        LineItemCalculator::recompute_amount(self);
    }

    /// Copies the line with a fresh identity, used when a template's lines are
    /// snapshotted onto a generated invoice
    pub fn duplicate(&self) -> Self {
        Self {
            id: LineItemId::new_v7(),
            ..self.clone()
        }
    }
}

/// A partial edit of a line item
#[derive(Debug, Clone, Default)]
pub struct LineItemUpdate {
    pub description: Option<String>,
    pub quantity: Option<Decimal>,
    pub rate: Option<Decimal>,
}

impl LineItemUpdate {
    pub fn apply(self, item: &mut LineItem) {
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(rate) = self.rate {
            item.rate = rate;
        }
        LineItemCalculator::recompute_amount(item);
    }
}
