//! Recurring invoice templates
//!
//! A [`RecurringInvoiceTemplate`] holds the content of an invoice that is
//! billed on a schedule (retainers, hosting, maintenance plans). Each time it
//! falls due a fresh [`Invoice`] is generated from a snapshot of the template;
//! later edits to the template never touch invoices already generated.

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::recurrence::{self, Recurring};
use core_kernel::validation::{validate_rule, validate_window};
use core_kernel::{
    ClientId, Currency, DateRange, Frequency, InvoiceTemplateId, LineItemId, Money, ProjectId, Rate,
    RecurrenceError, RecurrenceOptions, RecurrenceRule, ValidationErrors,
};

use crate::calculator::{Billable, InvoiceTotals, LineItemCalculator};
use crate::error::BillingError;
use crate::invoice::{Invoice, InvoiceStatus};
use crate::line_item::{LineItem, LineItemUpdate, MAX_LINE_QUANTITY, MAX_LINE_RATE};

/// Default number of days between issue and due date
pub const DEFAULT_PAYMENT_TERMS_DAYS: u32 = 30;

/// Billing cadence offered by the recurring-invoice form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceInterval {
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Every `customDays` days
    Custom,
}

impl fmt::Display for RecurrenceInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecurrenceInterval::Weekly => "weekly",
            RecurrenceInterval::Monthly => "monthly",
            RecurrenceInterval::Quarterly => "quarterly",
            RecurrenceInterval::Yearly => "yearly",
            RecurrenceInterval::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A template that produces an invoice on every occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringInvoiceTemplate {
    pub id: InvoiceTemplateId,
    pub name: String,
    pub client_id: ClientId,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    pub currency: Currency,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub tax_rate: Rate,
    pub discount: Money,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
    pub recurrence_interval: RecurrenceInterval,
    #[serde(default)]
    pub custom_days: Option<u32>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub next_generation_date: NaiveDate,
    #[serde(default)]
    pub last_generated: Option<DateTime<Utc>>,
    pub active: bool,
    /// Status given to each generated invoice
    #[serde(default)]
    pub initial_status: InvoiceStatus,
    #[serde(default = "default_payment_terms")]
    pub payment_terms_days: u32,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_payment_terms() -> u32 {
    DEFAULT_PAYMENT_TERMS_DAYS
}

impl RecurringInvoiceTemplate {
    /// Creates an active template whose first invoice falls on `start_date`
    pub fn new(
        name: impl Into<String>,
        client_id: ClientId,
        currency: Currency,
        recurrence_interval: RecurrenceInterval,
        start_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        let zero = InvoiceTotals::zero(currency);
        Self {
            id: InvoiceTemplateId::new_v7(),
            name: name.into(),
            client_id,
            project_id: None,
            currency,
            line_items: Vec::new(),
            tax_rate: Rate::zero(),
            discount: Money::zero(currency),
            subtotal: zero.subtotal,
            tax_amount: zero.tax_amount,
            total: zero.total,
            recurrence_interval,
            custom_days: None,
            start_date,
            end_date: None,
            next_generation_date: start_date,
            last_generated: None,
            active: true,
            initial_status: InvoiceStatus::Draft,
            payment_terms_days: DEFAULT_PAYMENT_TERMS_DAYS,
            notes: None,
            terms: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_project(mut self, project_id: ProjectId) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_custom_days(mut self, days: u32) -> Self {
        self.custom_days = Some(days);
        self
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        LineItemCalculator::recompute_totals(&mut self);
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

    pub fn with_initial_status(mut self, status: InvoiceStatus) -> Self {
        self.initial_status = status;
        self
    }

    pub fn with_payment_terms(mut self, days: u32) -> Self {
        self.payment_terms_days = days;
        self
    }

    pub fn add_item(&mut self, item: LineItem, now: DateTime<Utc>) {
        self.line_items.push(item);
        self.touch(now);
    }

    pub fn remove_item(&mut self, item_id: LineItemId, now: DateTime<Utc>) -> Result<LineItem, BillingError> {
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
        let item = self
            .line_items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(BillingError::LineItemNotFound(item_id))?;
        update.apply(item);
        self.touch(now);
        Ok(())
    }

    pub fn set_tax_rate(&mut self, tax_rate: Rate, now: DateTime<Utc>) {
        self.tax_rate = tax_rate;
        self.touch(now);
    }

    pub fn set_discount(&mut self, discount: Money, now: DateTime<Utc>) {
        self.discount = discount;
        self.touch(now);
    }

    /// Stops future generation without deleting the template
    pub fn pause(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.updated_at = now;
    }

    /// Re-enables generation
    ///
    /// The next generation date is left as it was, so a template paused for
    /// several periods produces a single invoice on the next sweep.
    pub fn resume(&mut self, now: DateTime<Utc>) {
        self.active = true;
        self.updated_at = now;
    }

    /// The recurrence rule behind the billing cadence
    pub fn rule(&self) -> RecurrenceRule {
        match self.recurrence_interval {
            RecurrenceInterval::Weekly => RecurrenceRule::weekly(1),
            RecurrenceInterval::Monthly => RecurrenceRule::monthly(1),
            RecurrenceInterval::Quarterly => RecurrenceRule::new(Frequency::Quarterly, 1),
            RecurrenceInterval::Yearly => RecurrenceRule::yearly(1),
            RecurrenceInterval::Custom => RecurrenceRule {
                custom_days: self.custom_days,
                ..RecurrenceRule::new(Frequency::Custom, 1)
            },
        }
    }

    pub fn window(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }

    /// Preview of the next `count` generation dates after the pending one
    pub fn upcoming(&self, options: RecurrenceOptions, count: usize) -> Result<Vec<NaiveDate>, RecurrenceError> {
        recurrence::upcoming(self.next_generation_date, &self.rule(), options, count)
    }

    /// Checks the template the way the recurring-invoice form does
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        errors.check(!self.name.trim().is_empty(), "name", "is required");
        validate_rule(&self.rule(), &mut errors);
        validate_window(&self.window(), &mut errors);
        errors.check(
            self.tax_rate.is_within_bounds(),
            "taxRate",
            "must be between 0 and 100",
        );
        errors.check(!self.discount.is_negative(), "discount", "must not be negative");
        errors.check(
            matches!(self.initial_status, InvoiceStatus::Draft | InvoiceStatus::Sent),
            "initialStatus",
            "generated invoices start as draft or sent",
        );

        for (index, item) in self.line_items.iter().enumerate() {
            errors.check(
                item.quantity > Decimal::ZERO,
                format!("lineItems[{}].quantity", index),
                "must be greater than 0",
            );
            errors.check(
                item.quantity <= MAX_LINE_QUANTITY,
                format!("lineItems[{}].quantity", index),
                format!("must not exceed {}", MAX_LINE_QUANTITY),
            );
            errors.check(
                item.rate >= Decimal::ZERO,
                format!("lineItems[{}].rate", index),
                "must not be negative",
            );
            errors.check(
                item.rate <= MAX_LINE_RATE,
                format!("lineItems[{}].rate", index),
                format!("must not exceed {}", MAX_LINE_RATE),
            );
        }

        errors.into_result()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        LineItemCalculator::recompute_totals(self);
        self.updated_at = now;
    }
}

impl Billable for RecurringInvoiceTemplate {
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

impl Recurring for RecurringInvoiceTemplate {
    type Instance = Invoice;

    fn is_active(&self) -> bool {
        self.active
    }

    fn next_due(&self) -> NaiveDate {
        self.next_generation_date
    }

    fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    fn recurrence_rule(&self) -> RecurrenceRule {
        self.rule()
    }

    /// Issues on the occurrence date and falls due after the payment terms
    fn instantiate(&self, occurrence: NaiveDate, now: DateTime<Utc>) -> Invoice {
        let due_date = occurrence
            .checked_add_days(Days::new(u64::from(self.payment_terms_days)))
            .unwrap_or(occurrence);

        let mut invoice = Invoice::new(self.client_id, occurrence, due_date, self.currency, now);
        invoice.project_id = self.project_id;
        invoice.template_id = Some(self.id);
        invoice.line_items = self.line_items.iter().map(LineItem::duplicate).collect();
        invoice.tax_rate = self.tax_rate;
        invoice.discount = self.discount;
        invoice.notes = self.notes.clone();
        invoice.terms = self.terms.clone();
        invoice.status = self.initial_status;
        if self.initial_status == InvoiceStatus::Sent {
            invoice.sent_at = Some(now);
        }
        LineItemCalculator::recompute_totals(&mut invoice);
        invoice
    }

    fn record_generation(&mut self, next_due: NaiveDate, generated_at: DateTime<Utc>) {
        self.next_generation_date = next_due;
        self.last_generated = Some(generated_at);
        self.updated_at = generated_at;
    }

    fn deactivate(&mut self, at: DateTime<Utc>) {
        self.pause(at);
    }
}
