//! Storage ports for the generation sweep
//!
//! The sweep reads templates and writes back generated records plus the
//! advanced templates. Hosts plug in whatever backs the dashboard; tests and
//! the command-line sweep use [`crate::adapters::InMemoryScheduleStore`].
//!
//! Saves are upserts keyed by id.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};
use domain_billing::{Invoice, RecurringInvoiceTemplate};
use domain_tasks::{RecurringTask, Task};

/// Storage for recurring tasks and the tasks they generate
#[async_trait]
pub trait RecurringTaskPort: DomainPort {
    async fn list_recurring_tasks(&self) -> Result<Vec<RecurringTask>, PortError>;

    async fn save_recurring_task(&self, template: &RecurringTask) -> Result<(), PortError>;

    async fn save_task(&self, task: &Task) -> Result<(), PortError>;
}

/// Storage for recurring invoice templates and the invoices they generate
#[async_trait]
pub trait InvoiceTemplatePort: DomainPort {
    async fn list_invoice_templates(&self) -> Result<Vec<RecurringInvoiceTemplate>, PortError>;

    async fn save_invoice_template(&self, template: &RecurringInvoiceTemplate) -> Result<(), PortError>;

    async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError>;
}
