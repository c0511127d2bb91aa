//! Invoice management
//!
//! An [`Invoice`] is a concrete bill sent to a client. It is either created by
//! hand or generated from a recurring template; either way it owns its line
//! items and keeps its totals in step with them through
//! [`LineItemCalculator`].
//!
//! # Lifecycle
//!
//! ```text
//! Draft ──send──► Sent ──view──► Viewed
//!                  │               │
//!                  └──── payment ──┴──► Partial ──► Paid
//!                  │               │       │
//!                  └─ past due ────┴───────┴──► Overdue ── payment ──► Partial / Paid
//!
//! any status except Paid ──cancel──► Cancelled
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    ClientId, Currency, InvoiceId, InvoiceTemplateId, LineItemId, Money, ProjectId, Rate,
};

use crate::calculator::{Billable, InvoiceTotals, LineItemCalculator};
use crate::error::BillingError;
use crate::line_item::{LineItem, LineItemUpdate};

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Viewed,
    Paid,
    /// Some but not all of the total has been received
    Partial,
    Overdue,
    Cancelled,
}

impl InvoiceStatus {
    /// Statuses in which the client still owes money
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Sent | InvoiceStatus::Viewed | InvoiceStatus::Partial | InvoiceStatus::Overdue
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InvoiceStatus::Paid | InvoiceStatus::Cancelled)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Viewed => "viewed",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Partial => "partial",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// An invoice for agency work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    /// Human-readable number, assigned before the invoice is sent
    pub invoice_number: Option<String>,
    pub client_id: ClientId,
    pub project_id: Option<ProjectId>,
    /// Template this invoice was generated from, if any
    pub template_id: Option<InvoiceTemplateId>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub currency: Currency,
    pub line_items: Vec<LineItem>,
    pub tax_rate: Rate,
    pub discount: Money,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
    pub amount_paid: Money,
    pub status: InvoiceStatus,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates an empty draft invoice
    ///
    /// # Arguments
    ///
    /// * `client_id` - Client being billed
    /// * `issue_date` - Date printed on the invoice
    /// * `due_date` - Payment due date
    /// * `currency` - Invoice currency
    /// * `now` - Creation instant
    pub fn new(
        client_id: ClientId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        currency: Currency,
        now: DateTime<Utc>,
    ) -> Self {
        let zero = InvoiceTotals::zero(currency);
        Self {
            id: InvoiceId::new_v7(),
            invoice_number: None,
            client_id,
            project_id: None,
            template_id: None,
            issue_date,
            due_date,
            currency,
            line_items: Vec::new(),
            tax_rate: Rate::zero(),
            discount: Money::zero(currency),
            subtotal: zero.subtotal,
            tax_amount: zero.tax_amount,
            total: zero.total,
            amount_paid: Money::zero(currency),
            status: InvoiceStatus::Draft,
            notes: None,
            terms: None,
            sent_at: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_tax_rate(mut self, tax_rate: Rate) -> Self {
        self.tax_rate = tax_rate;
        LineItemCalculator::recompute_totals(&mut self);
        self
    }

    pub fn with_discount(mut self, discount: Money) -> Self {
        self.discount = discount;
        LineItemCalculator::recompute_totals(&mut self);
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        LineItemCalculator::recompute_totals(&mut self);
        self
    }

    /// Edits are refused once money has been received or the invoice is void
    pub fn is_editable(&self) -> bool {
        !matches!(
            self.status,
            InvoiceStatus::Paid | InvoiceStatus::Partial | InvoiceStatus::Cancelled
        )
    }

    fn ensure_editable(&self) -> Result<(), BillingError> {
        if self.is_editable() {
            Ok(())
        } else {
            Err(BillingError::NotEditable(self.status))
        }
    }

    pub fn add_item(&mut self, item: LineItem, now: DateTime<Utc>) -> Result<(), BillingError> {
        self.ensure_editable()?;
        self.line_items.push(item);
        self.touch(now);
        Ok(())
    }

    pub fn remove_item(&mut self, item_id: LineItemId, now: DateTime<Utc>) -> Result<LineItem, BillingError> {
        self.ensure_editable()?;
        let index = self
            .line_items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(BillingError::LineItemNotFound(item_id))?;
        let removed = self.line_items.remove(index);
        self.touch(now);
        Ok(removed)
    }

    pub fn update_item(
        &mut self,
        item_id: LineItemId,
        update: LineItemUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), BillingError> {
        self.ensure_editable()?;
        let item = self
            .line_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(BillingError::LineItemNotFound(item_id))?;
        update.apply(item);
        self.touch(now);
        Ok(())
    }

    pub fn set_tax_rate(&mut self, tax_rate: Rate, now: DateTime<Utc>) -> Result<(), BillingError> {
        self.ensure_editable()?;
        self.tax_rate = tax_rate;
        self.touch(now);
        Ok(())
    }

    pub fn set_discount(&mut self, discount: Money, now: DateTime<Utc>) -> Result<(), BillingError> {
        self.ensure_editable()?;
        self.discount = discount;
        self.touch(now);
        Ok(())
    }

    pub fn assign_number(&mut self, number: impl Into<String>) {
        self.invoice_number = Some(number.into());
    }

    /// Sends a numbered draft to the client
    pub fn send(&mut self, now: DateTime<Utc>) -> Result<(), BillingError> {
        self.transition(InvoiceStatus::Draft, InvoiceStatus::Sent)?;
        if self.invoice_number.is_none() {
            return Err(BillingError::MissingInvoiceNumber);
        }
        self.status = InvoiceStatus::Sent;
        self.sent_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Records that the client opened the invoice; repeated views are no-ops
    pub fn mark_viewed(&mut self, now: DateTime<Utc>) -> Result<(), BillingError> {
        match self.status {
            InvoiceStatus::Sent => {
                self.status = InvoiceStatus::Viewed;
                self.updated_at = now;
                Ok(())
            }
            InvoiceStatus::Viewed | InvoiceStatus::Partial | InvoiceStatus::Overdue | InvoiceStatus::Paid => Ok(()),
            from => Err(BillingError::InvalidStatusTransition {
                from,
                to: InvoiceStatus::Viewed,
            }),
        }
    }

    /// Records a payment against the invoice
    ///
    /// Moves to `Paid` once the amount paid covers the total, otherwise to
    /// `Partial`.
    pub fn record_payment(&mut self, amount: Money, now: DateTime<Utc>) -> Result<(), BillingError> {
        if !self.status.is_outstanding() {
            return Err(BillingError::InvalidStatusTransition {
                from: self.status,
                to: InvoiceStatus::Paid,
            });
        }
        if !amount.is_positive() {
            return Err(BillingError::InvalidPayment(format!(
                "payment amount must be positive, got {}",
                amount
            )));
        }

        self.amount_paid = self.amount_paid.checked_add(&amount)?;
        self.updated_at = now;

        if self.amount_paid.amount() >= self.total.amount() {
            self.status = InvoiceStatus::Paid;
            self.paid_at = Some(now);
        } else {
            self.status = InvoiceStatus::Partial;
        }
        Ok(())
    }

    /// Flags an unpaid invoice whose due date has passed
    ///
    /// Returns true when the status changed.
    pub fn mark_overdue(&mut self, today: NaiveDate, now: DateTime<Utc>) -> bool {
        if self.is_overdue(today) && self.status != InvoiceStatus::Overdue {
            self.status = InvoiceStatus::Overdue;
            self.updated_at = now;
            true
        } else {
            false
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        today > self.due_date && self.status.is_outstanding()
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), BillingError> {
        if self.status.is_terminal() {
            return Err(BillingError::InvalidStatusTransition {
                from: self.status,
                to: InvoiceStatus::Cancelled,
            });
        }
        self.status = InvoiceStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Returns the balance due
    pub fn balance_due(&self) -> Money {
        Money::new(self.total.amount() - self.amount_paid.amount(), self.currency)
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals {
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            total: self.total,
        }
    }

    fn transition(&self, expected: InvoiceStatus, to: InvoiceStatus) -> Result<(), BillingError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(BillingError::InvalidStatusTransition {
                from: self.status,
                to,
            })
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        LineItemCalculator::recompute_totals(self);
        self.updated_at = now;
    }
}

impl Billable for Invoice {
    fn currency(&self) -> Currency {
        self.currency
    }

    fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    fn line_items_mut(&mut self) -> &mut [LineItem] {
        &mut self.line_items
    }

    fn tax_rate(&self) -> Rate {
        self.tax_rate
    }

    fn discount(&self) -> Money {
        self.discount
    }

    fn apply_totals(&mut self, totals: InvoiceTotals) {
        self.subtotal = totals.subtotal;
        self.tax_amount = totals.tax_amount;
        self.total = totals.total;
    }
}
