//! In-memory schedule store
//!
//! Backs both sweep ports with maps behind `tokio` read-write locks. Used by
//! tests and by the command-line sweep, which loads a JSON snapshot into the
//! store, runs once and dumps the store back out.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use core_kernel::{DomainPort, InvoiceId, InvoiceTemplateId, PortError, RecurringTaskId, TaskId};
use domain_billing::{Invoice, RecurringInvoiceTemplate};
use domain_tasks::{RecurringTask, Task};

use crate::ports::{InvoiceTemplatePort, RecurringTaskPort};

/// Maps keyed by id, so listings come back in id order
#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleStore {
    recurring_tasks: Arc<RwLock<BTreeMap<RecurringTaskId, RecurringTask>>>,
    tasks: Arc<RwLock<BTreeMap<TaskId, Task>>>,
    invoice_templates: Arc<RwLock<BTreeMap<InvoiceTemplateId, RecurringInvoiceTemplate>>>,
    invoices: Arc<RwLock<BTreeMap<InvoiceId, Invoice>>>,
}

impl InMemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store with templates
    pub async fn with_templates(
        recurring_tasks: Vec<RecurringTask>,
        invoice_templates: Vec<RecurringInvoiceTemplate>,
    ) -> Self {
        let store = Self::new();
        {
            let mut map = store.recurring_tasks.write().await;
            for template in recurring_tasks {
                map.insert(template.id, template);
            }
        }
        {
            let mut map = store.invoice_templates.write().await;
            for template in invoice_templates {
                map.insert(template.id, template);
            }
        }
        store
    }

    pub async fn recurring_tasks(&self) -> Vec<RecurringTask> {
        self.recurring_tasks.read().await.values().cloned().collect()
    }

    pub async fn recurring_task(&self, id: RecurringTaskId) -> Option<RecurringTask> {
        self.recurring_tasks.read().await.get(&id).cloned()
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.values().cloned().collect()
    }

    pub async fn invoice_templates(&self) -> Vec<RecurringInvoiceTemplate> {
        self.invoice_templates.read().await.values().cloned().collect()
    }

    pub async fn invoice_template(&self, id: InvoiceTemplateId) -> Option<RecurringInvoiceTemplate> {
        self.invoice_templates.read().await.get(&id).cloned()
    }

    pub async fn invoices(&self) -> Vec<Invoice> {
        self.invoices.read().await.values().cloned().collect()
    }
}

impl DomainPort for InMemoryScheduleStore {}

#[async_trait]
impl RecurringTaskPort for InMemoryScheduleStore {
    async fn list_recurring_tasks(&self) -> Result<Vec<RecurringTask>, PortError> {
        Ok(self.recurring_tasks().await)
    }

    #[instrument(skip(self, template), fields(template_id = %template.id))]
    async fn save_recurring_task(&self, template: &RecurringTask) -> Result<(), PortError> {
        debug!("Saving recurring task");
        self.recurring_tasks
            .write()
            .await
            .insert(template.id, template.clone());
        Ok(())
    }

    #[instrument(skip(self, task), fields(task_id = %task.id))]
    async fn save_task(&self, task: &Task) -> Result<(), PortError> {
        debug!("Saving task");
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(())
    }
}

#[async_trait]
impl InvoiceTemplatePort for InMemoryScheduleStore {
    async fn list_invoice_templates(&self) -> Result<Vec<RecurringInvoiceTemplate>, PortError> {
        Ok(self.invoice_templates().await)
    }

    #[instrument(skip(self, template), fields(template_id = %template.id))]
    async fn save_invoice_template(&self, template: &RecurringInvoiceTemplate) -> Result<(), PortError> {
        debug!("Saving invoice template");
        self.invoice_templates
            .write()
            .await
            .insert(template.id, template.clone());
        Ok(())
    }

    #[instrument(skip(self, invoice), fields(invoice_id = %invoice.id))]
    async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
        debug!("Saving invoice");
        self.invoices.write().await.insert(invoice.id, invoice.clone());
        Ok(())
    }
}
