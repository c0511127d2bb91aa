//! Test Data Builders
//!
//! Builders for templates with sensible defaults, so a test only spells out
//! the fields it is about.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{ClientId, Currency, Money, Rate, RecurrenceRule};
use domain_billing::{InvoiceStatus, LineItem, RecurrenceInterval, RecurringInvoiceTemplate};
use domain_tasks::RecurringTask;
use rust_decimal::Decimal;

use crate::fixtures::{BillingFixtures, TemporalFixtures};

/// Builder for recurring tasks
pub struct RecurringTaskBuilder {
    title: String,
    rule: RecurrenceRule,
    start_date: NaiveDate,
    next_due: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    active: bool,
    created_at: DateTime<Utc>,
}

impl Default for RecurringTaskBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecurringTaskBuilder {
    /// Weekly task starting Monday 2024-01-01
    pub fn new() -> Self {
        Self {
            title: "Weekly client report".to_string(),
            rule: RecurrenceRule::weekly(1),
            start_date: TemporalFixtures::new_year_2024(),
            next_due: None,
            end_date: None,
            active: true,
            created_at: TemporalFixtures::morning(2023, 12, 1),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    /// Overrides the pending occurrence, as after earlier sweeps
    pub fn next_due(mut self, next_due: NaiveDate) -> Self {
        self.next_due = Some(next_due);
        self
    }

    pub fn ending(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn paused(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> RecurringTask {
        let mut task = RecurringTask::new(self.title, self.rule, self.start_date, self.created_at);
        if let Some(next_due) = self.next_due {
            task.next_due = next_due;
        }
        task.end_date = self.end_date;
        task.is_active = self.active;
        task
    }
}

/// Builder for recurring invoice templates
pub struct InvoiceTemplateBuilder {
    name: String,
    client_id: ClientId,
    currency: Currency,
    interval: RecurrenceInterval,
    custom_days: Option<u32>,
    start_date: NaiveDate,
    next_generation_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    items: Vec<LineItem>,
    tax_rate: Rate,
    discount: Decimal,
    initial_status: InvoiceStatus,
    active: bool,
    created_at: DateTime<Utc>,
}

impl Default for InvoiceTemplateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceTemplateBuilder {
    /// Monthly USD template starting 2024-01-01 with the standard two lines
    pub fn new() -> Self {
        Self {
            name: "Hosting and design".to_string(),
            client_id: ClientId::new(),
            currency: Currency::USD,
            interval: RecurrenceInterval::Monthly,
            custom_days: None,
            start_date: TemporalFixtures::new_year_2024(),
            next_generation_date: None,
            end_date: None,
            items: BillingFixtures::standard_items(),
            tax_rate: Rate::zero(),
            discount: Decimal::ZERO,
            initial_status: InvoiceStatus::Draft,
            active: true,
            created_at: TemporalFixtures::morning(2023, 12, 1),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn for_client(mut self, client_id: ClientId) -> Self {
        self.client_id = client_id;
        self
    }

    pub fn with_interval(mut self, interval: RecurrenceInterval) -> Self {
        self.interval = interval;
        self
    }

    pub fn every_days(mut self, days: u32) -> Self {
        self.interval = RecurrenceInterval::Custom;
        self.custom_days = Some(days);
        self
    }

    pub fn starting(mut self, start_date: NaiveDate) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn next_generation(mut self, date: NaiveDate) -> Self {
        self.next_generation_date = Some(date);
        self
    }

    pub fn ending(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    pub fn with_tax_rate(mut self, tax_rate: Rate) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
        self
    }

    pub fn issued_as(mut self, status: InvoiceStatus) -> Self {
        self.initial_status = status;
        self
    }

    pub fn paused(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn build(self) -> RecurringInvoiceTemplate {
        let mut template = RecurringInvoiceTemplate::new(
            self.name,
            self.client_id,
            self.currency,
            self.interval,
            self.start_date,
            self.created_at,
        )
        .with_tax_rate(self.tax_rate)
        .with_discount(Money::new(self.discount, self.currency))
        .with_initial_status(self.initial_status);

        for item in self.items {
            template = template.with_item(item);
        }
        if let Some(days) = self.custom_days {
            template = template.with_custom_days(days);
        }
        if let Some(end_date) = self.end_date {
            template = template.with_end_date(end_date);
        }
        if let Some(date) = self.next_generation_date {
            template.next_generation_date = date;
        }
        template.active = self.active;
        template
    }
}
