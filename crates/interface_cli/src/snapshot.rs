//! Snapshot documents read and written by the sweep command

use serde::{Deserialize, Serialize};

use domain_billing::{Invoice, InvoiceNumberSequence, RecurringInvoiceTemplate};
use domain_scheduling::SweepReport;
use domain_tasks::{RecurringTask, Task};

/// The templates to sweep, as exported from the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSnapshot {
    #[serde(default)]
    pub recurring_tasks: Vec<RecurringTask>,
    #[serde(default)]
    pub invoice_templates: Vec<RecurringInvoiceTemplate>,
    /// Counter state from the previous run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_numbering: Option<InvoiceNumberSequence>,
}

/// Everything one sweep produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepOutput {
    pub report: SweepReport,
    /// Templates after the sweep, ready to feed into the next run
    pub snapshot: ScheduleSnapshot,
    pub generated_tasks: Vec<Task>,
    pub generated_invoices: Vec<Invoice>,
}
