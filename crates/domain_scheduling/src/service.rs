//! Generation sweep
//!
//! [`GenerationService::run_sweep`] walks every recurring task and recurring
//! invoice template once, at the clock's current instant:
//!
//! 1. skip it if inactive or not yet due
//! 2. validate the template
//! 3. materialize exactly one instance
//! 4. number the invoice (invoices only)
//! 5. save the instance, then the advanced template
//!
//! An invoice number is consumed as soon as the numbered invoice is saved.
//!
//! A failure on one template is recorded in the [`SweepReport`] and the
//! sweep moves on. Only a failure to list templates aborts the run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use core_kernel::recurrence::Recurring;
use core_kernel::{Clock, PortError, ValidationErrors};
use domain_billing::{InvoiceNumberSequence, RecurringInvoiceTemplate};
use domain_tasks::{RecurringTask, Task};

use crate::error::SchedulingError;
use crate::materializer::{GenerationPolicy, Materialized, TemplateMaterializer};
use crate::ports::{InvoiceTemplatePort, RecurringTaskPort};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    RecurringTask,
    InvoiceTemplate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Inactive,
    NotDue,
}

/// One instance produced by the sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecord {
    pub kind: TemplateKind,
    pub template_id: String,
    pub instance_id: String,
    pub occurrence: NaiveDate,
    pub next_due: NaiveDate,
    /// Invoice number, for generated invoices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedTemplate {
    pub kind: TemplateKind,
    pub template_id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepFailure {
    pub kind: TemplateKind,
    pub template_id: String,
    pub message: String,
}

/// Outcome of one sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub run_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub generated: Vec<GeneratedRecord>,
    pub skipped: Vec<SkippedTemplate>,
    /// Templates switched off because their run passed its end date
    pub deactivated: Vec<String>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    fn new(run_at: DateTime<Utc>, today: NaiveDate) -> Self {
        Self {
            run_at,
            today,
            generated: Vec::new(),
            skipped: Vec::new(),
            deactivated: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn generated_count(&self, kind: TemplateKind) -> usize {
        self.generated.iter().filter(|g| g.kind == kind).count()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn skip(&mut self, kind: TemplateKind, template_id: String, reason: SkipReason) {
        self.skipped.push(SkippedTemplate {
            kind,
            template_id,
            reason,
        });
    }

    fn fail(&mut self, kind: TemplateKind, template_id: String, error: &SchedulingError) {
        warn!(?kind, %template_id, %error, "Template generation failed");
        self.failures.push(SweepFailure {
            kind,
            template_id,
            message: error.to_string(),
        });
    }
}

enum Plan<T, I> {
    Skip(SkipReason),
    Generate(Materialized<T, I>),
}

/// Runs generation sweeps against the storage ports
pub struct GenerationService {
    clock: Arc<dyn Clock>,
    tasks: Arc<dyn RecurringTaskPort>,
    invoices: Arc<dyn InvoiceTemplatePort>,
    materializer: TemplateMaterializer,
    numbering: Mutex<InvoiceNumberSequence>,
}

impl GenerationService {
    pub fn new(
        clock: Arc<dyn Clock>,
        tasks: Arc<dyn RecurringTaskPort>,
        invoices: Arc<dyn InvoiceTemplatePort>,
        policy: GenerationPolicy,
        numbering: InvoiceNumberSequence,
    ) -> Self {
        Self {
            clock,
            tasks,
            invoices,
            materializer: TemplateMaterializer::new(policy),
            numbering: Mutex::new(numbering),
        }
    }

    pub fn materializer(&self) -> &TemplateMaterializer {
        &self.materializer
    }

    /// Current state of the invoice number counter
    pub async fn numbering(&self) -> InvoiceNumberSequence {
        self.numbering.lock().await.clone()
    }

    /// Runs one sweep over every stored template
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::Port`] only if a template listing fails.
    /// Per-template failures are reported in [`SweepReport::failures`].
    #[instrument(skip(self))]
    pub async fn run_sweep(&self) -> Result<SweepReport, SchedulingError> {
        let now = self.clock.now();
        let today = self.materializer.today(now);
        let mut report = SweepReport::new(now, today);

        info!(%now, %today, "Starting generation sweep");

        for template in self.tasks.list_recurring_tasks().await? {
            self.sweep_recurring_task(template, now, &mut report).await;
        }
        for template in self.invoices.list_invoice_templates().await? {
            self.sweep_invoice_template(template, now, &mut report).await;
        }

        info!(
            generated = report.generated.len(),
            skipped = report.skipped.len(),
            deactivated = report.deactivated.len(),
            failures = report.failures.len(),
            "Generation sweep complete"
        );
        Ok(report)
    }

    async fn sweep_recurring_task(&self, template: RecurringTask, now: DateTime<Utc>, report: &mut SweepReport) {
        let kind = TemplateKind::RecurringTask;
        let template_id = template.id.to_string();

        let materialized = match self.plan(&template, template.validate(), now) {
            Ok(Plan::Generate(materialized)) => materialized,
            Ok(Plan::Skip(reason)) => {
                debug!(%template_id, ?reason, "Skipping recurring task");
                report.skip(kind, template_id, reason);
                return;
            }
            Err(error) => {
                report.fail(kind, template_id, &error);
                return;
            }
        };

        let Materialized {
            instance,
            template: updated,
            occurrence,
            deactivated,
        } = materialized;

        if let Err(error) = self.persist_task(&instance, &updated).await {
            report.fail(kind, template_id, &SchedulingError::from(error));
            return;
        }

        info!(%template_id, task_id = %instance.id, %occurrence, "Generated task");
        if deactivated {
            report.deactivated.push(template_id.clone());
        }
        report.generated.push(GeneratedRecord {
            kind,
            template_id,
            instance_id: instance.id.to_string(),
            occurrence,
            next_due: updated.next_due,
            invoice_number: None,
        });
    }

    async fn sweep_invoice_template(
        &self,
        template: RecurringInvoiceTemplate,
        now: DateTime<Utc>,
        report: &mut SweepReport,
    ) {
        let kind = TemplateKind::InvoiceTemplate;
        let template_id = template.id.to_string();

        let materialized = match self.plan(&template, template.validate(), now) {
            Ok(Plan::Generate(materialized)) => materialized,
            Ok(Plan::Skip(reason)) => {
                debug!(%template_id, ?reason, "Skipping invoice template");
                report.skip(kind, template_id, reason);
                return;
            }
            Err(error) => {
                report.fail(kind, template_id, &error);
                return;
            }
        };

        let Materialized {
            instance: mut invoice,
            template: updated,
            occurrence,
            deactivated,
        } = materialized;

        // A number is consumed once the invoice carrying it is stored, even if
        // the template save below fails.
        let mut numbering = self.numbering.lock().await;
        let mut candidate = numbering.clone();
        candidate.assign(&mut invoice);

        if let Err(error) = self.invoices.save_invoice(&invoice).await {
            report.fail(kind, template_id, &SchedulingError::from(error));
            return;
        }
        *numbering = candidate;
        drop(numbering);

        if let Err(error) = self.invoices.save_invoice_template(&updated).await {
            report.fail(kind, template_id, &SchedulingError::from(error));
            return;
        }

        info!(
            %template_id,
            invoice_id = %invoice.id,
            invoice_number = invoice.invoice_number.as_deref().unwrap_or_default(),
            total = %invoice.total,
            "Generated invoice"
        );
        if deactivated {
            report.deactivated.push(template_id.clone());
        }
        report.generated.push(GeneratedRecord {
            kind,
            template_id,
            instance_id: invoice.id.to_string(),
            occurrence,
            next_due: updated.next_generation_date,
            invoice_number: invoice.invoice_number.clone(),
        });
    }

    async fn persist_task(&self, task: &Task, template: &RecurringTask) -> Result<(), PortError> {
        self.tasks.save_task(task).await?;
        self.tasks.save_recurring_task(template).await
    }

    /// Decides what to do with one template
    fn plan<T>(
        &self,
        template: &T,
        validation: Result<(), ValidationErrors>,
        now: DateTime<Utc>,
    ) -> Result<Plan<T, T::Instance>, SchedulingError>
    where
        T: Recurring + Clone,
    {
        if !template.is_active() {
            return Ok(Plan::Skip(SkipReason::Inactive));
        }
        if !self.materializer.is_due(template, now) {
            return Ok(Plan::Skip(SkipReason::NotDue));
        }
        validation?;
        self.materializer.generate(template, now).map(Plan::Generate)
    }
}
