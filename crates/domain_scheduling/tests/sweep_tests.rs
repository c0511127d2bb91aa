//! Generation sweep tests

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use core_kernel::{DomainPort, FixedClock, PortError, RecurrenceRule};
use domain_billing::{Invoice, InvoiceNumberSequence, LineItem, RecurringInvoiceTemplate};
use domain_scheduling::{
    GenerationPolicy, GenerationService, InMemoryScheduleStore, InvoiceTemplatePort, SkipReason,
    TemplateKind,
};
use test_utils::{InvoiceTemplateBuilder, RecurringTaskBuilder, TemporalFixtures as T};

fn service(clock: FixedClock, store: &Arc<InMemoryScheduleStore>) -> GenerationService {
    GenerationService::new(
        Arc::new(clock),
        store.clone(),
        store.clone(),
        GenerationPolicy::default(),
        InvoiceNumberSequence::default(),
    )
}

#[tokio::test]
async fn test_sweep_generates_due_templates_only() {
    let due = RecurringTaskBuilder::new().with_title("Due").build();
    let later = RecurringTaskBuilder::new()
        .with_title("Later")
        .starting(T::date(2024, 2, 1))
        .build();
    let paused = RecurringTaskBuilder::new().with_title("Paused").paused().build();
    let invoice_template = InvoiceTemplateBuilder::new().build();

    let store = Arc::new(
        InMemoryScheduleStore::with_templates(
            vec![due.clone(), later.clone(), paused.clone()],
            vec![invoice_template.clone()],
        )
        .await,
    );
    let report = service(T::clock_at(2024, 1, 1), &store).run_sweep().await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.today, T::date(2024, 1, 1));
    assert_eq!(report.generated_count(TemplateKind::RecurringTask), 1);
    assert_eq!(report.generated_count(TemplateKind::InvoiceTemplate), 1);
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .any(|s| s.template_id == later.id.to_string() && s.reason == SkipReason::NotDue));
    assert!(report
        .skipped
        .iter()
        .any(|s| s.template_id == paused.id.to_string() && s.reason == SkipReason::Inactive));

    let tasks = store.tasks().await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].recurring_task_id, Some(due.id));
    assert_eq!(tasks[0].due_date, Some(T::date(2024, 1, 1)));

    let advanced = store.recurring_task(due.id).await.unwrap();
    assert_eq!(advanced.next_due, T::date(2024, 1, 8));

    let untouched = store.recurring_task(later.id).await.unwrap();
    assert_eq!(untouched, later);
}

#[tokio::test]
async fn test_generated_invoices_are_numbered() {
    let first = InvoiceTemplateBuilder::new().with_name("Hosting").build();
    let second = InvoiceTemplateBuilder::new().with_name("Support").build();
    let store = Arc::new(InMemoryScheduleStore::with_templates(Vec::new(), vec![first, second]).await);

    let service = service(T::clock_at(2024, 1, 1), &store);
    let report = service.run_sweep().await.unwrap();

    let mut numbers: Vec<String> = report
        .generated
        .iter()
        .filter_map(|g| g.invoice_number.clone())
        .collect();
    numbers.sort();
    assert_eq!(numbers, vec!["INV-2024-0001", "INV-2024-0002"]);

    let invoices = store.invoices().await;
    assert!(invoices.iter().all(|i| i.invoice_number.is_some()));
    assert_eq!(service.numbering().await, InvoiceNumberSequence::resume("INV", 2024, 2));
}

#[tokio::test]
async fn test_repeated_sweeps_do_not_duplicate() {
    let store = Arc::new(
        InMemoryScheduleStore::with_templates(vec![RecurringTaskBuilder::new().build()], Vec::new()).await,
    );
    let clock = T::clock_at(2024, 1, 1);
    let service = service(clock.clone(), &store);

    service.run_sweep().await.unwrap();
    let report = service.run_sweep().await.unwrap();

    assert!(report.generated.is_empty());
    assert_eq!(report.skipped[0].reason, SkipReason::NotDue);
    assert_eq!(store.tasks().await.len(), 1);

    clock.set(T::morning(2024, 1, 8));
    let report = service.run_sweep().await.unwrap();
    assert_eq!(report.generated.len(), 1);
    assert_eq!(store.tasks().await.len(), 2);
}

#[tokio::test]
async fn test_long_pause_yields_single_instance() {
    let mut template = RecurringTaskBuilder::new().build();
    template.pause(T::morning(2024, 1, 1));
    template.resume(T::morning(2024, 4, 1));

    let store = Arc::new(InMemoryScheduleStore::with_templates(vec![template.clone()], Vec::new()).await);
    let report = service(T::clock_at(2024, 4, 1), &store).run_sweep().await.unwrap();

    assert_eq!(report.generated.len(), 1);
    assert_eq!(report.generated[0].occurrence, T::date(2024, 1, 1));
    assert_eq!(report.generated[0].next_due, T::date(2024, 1, 8));
}

#[tokio::test]
async fn test_end_date_deactivation_is_reported() {
    let template = RecurringTaskBuilder::new().ending(T::date(2024, 1, 3)).build();
    let store = Arc::new(InMemoryScheduleStore::with_templates(vec![template.clone()], Vec::new()).await);

    let report = service(T::clock_at(2024, 1, 1), &store).run_sweep().await.unwrap();

    assert_eq!(report.deactivated, vec![template.id.to_string()]);
    assert!(!store.recurring_task(template.id).await.unwrap().is_active);
}

#[tokio::test]
async fn test_invalid_template_fails_without_stopping_sweep() {
    let broken = RecurringTaskBuilder::new()
        .with_rule(RecurrenceRule::daily(0))
        .build();
    let fine = RecurringTaskBuilder::new().with_title("Fine").build();
    let store = Arc::new(
        InMemoryScheduleStore::with_templates(vec![broken.clone(), fine.clone()], Vec::new()).await,
    );

    let report = service(T::clock_at(2024, 1, 1), &store).run_sweep().await.unwrap();

    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].template_id, broken.id.to_string());
    assert!(report.failures[0].message.contains("interval"));
    assert_eq!(report.generated.len(), 1);
    assert_eq!(report.generated[0].template_id, fine.id.to_string());

    let unchanged = store.recurring_task(broken.id).await.unwrap();
    assert_eq!(unchanged.next_due, broken.next_due);
}

/// Rejects every invoice write
struct ReadOnlyInvoices {
    templates: Vec<RecurringInvoiceTemplate>,
}

impl DomainPort for ReadOnlyInvoices {}

#[async_trait]
impl InvoiceTemplatePort for ReadOnlyInvoices {
    async fn list_invoice_templates(&self) -> Result<Vec<RecurringInvoiceTemplate>, PortError> {
        Ok(self.templates.clone())
    }

    async fn save_invoice_template(&self, _template: &RecurringInvoiceTemplate) -> Result<(), PortError> {
        Err(PortError::connection("invoice store unavailable"))
    }

    async fn save_invoice(&self, _invoice: &Invoice) -> Result<(), PortError> {
        Err(PortError::connection("invoice store unavailable"))
    }
}

#[tokio::test]
async fn test_failed_save_keeps_number_and_continues() {
    let template = InvoiceTemplateBuilder::new()
        .with_items(vec![LineItem::new("Hosting", dec!(1), dec!(40))])
        .build();
    let invoices = Arc::new(ReadOnlyInvoices {
        templates: vec![template.clone()],
    });
    let tasks = Arc::new(
        InMemoryScheduleStore::with_templates(vec![RecurringTaskBuilder::new().build()], Vec::new()).await,
    );

    let service = GenerationService::new(
        Arc::new(T::clock_at(2024, 1, 1)),
        tasks.clone(),
        invoices,
        GenerationPolicy::default(),
        InvoiceNumberSequence::default(),
    );
    let report = service.run_sweep().await.unwrap();

    assert_eq!(report.generated_count(TemplateKind::RecurringTask), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, TemplateKind::InvoiceTemplate);
    assert_eq!(service.numbering().await, InvoiceNumberSequence::default());
}

/// Stores invoices but rejects the first template save
struct FirstTemplateSaveFails {
    templates: Vec<RecurringInvoiceTemplate>,
    invoices: Mutex<Vec<Invoice>>,
    failed_once: AtomicBool,
}

impl DomainPort for FirstTemplateSaveFails {}

#[async_trait]
impl InvoiceTemplatePort for FirstTemplateSaveFails {
    async fn list_invoice_templates(&self) -> Result<Vec<RecurringInvoiceTemplate>, PortError> {
        Ok(self.templates.clone())
    }

    async fn save_invoice_template(&self, _template: &RecurringInvoiceTemplate) -> Result<(), PortError> {
        if self.failed_once.swap(true, Ordering::SeqCst) {
            Ok(())
        } else {
            Err(PortError::conflict("template changed underneath the sweep"))
        }
    }

    async fn save_invoice(&self, invoice: &Invoice) -> Result<(), PortError> {
        self.invoices.lock().await.push(invoice.clone());
        Ok(())
    }
}

#[tokio::test]
async fn test_stored_invoice_keeps_its_number_when_template_save_fails() {
    let invoices = Arc::new(FirstTemplateSaveFails {
        templates: vec![
            InvoiceTemplateBuilder::new().with_name("Hosting").build(),
            InvoiceTemplateBuilder::new().with_name("Support").build(),
        ],
        invoices: Mutex::new(Vec::new()),
        failed_once: AtomicBool::new(false),
    });
    let tasks = Arc::new(InMemoryScheduleStore::default());

    let service = GenerationService::new(
        Arc::new(T::clock_at(2024, 1, 1)),
        tasks,
        invoices.clone(),
        GenerationPolicy::default(),
        InvoiceNumberSequence::default(),
    );
    let report = service.run_sweep().await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.generated_count(TemplateKind::InvoiceTemplate), 1);

    let numbers: Vec<Option<String>> = invoices
        .invoices
        .lock()
        .await
        .iter()
        .map(|i| i.invoice_number.clone())
        .collect();
    assert_eq!(
        numbers,
        vec![Some("INV-2024-0001".to_string()), Some("INV-2024-0002".to_string())]
    );
    assert_eq!(service.numbering().await, InvoiceNumberSequence::resume("INV", 2024, 2));
}

#[tokio::test]
async fn test_late_invoice_from_previous_year_continues_that_year() {
    let current = InvoiceTemplateBuilder::new()
        .with_name("Current")
        .starting(T::date(2025, 1, 1))
        .build();
    let behind = InvoiceTemplateBuilder::new()
        .with_name("Behind")
        .starting(T::date(2024, 12, 1))
        .build();
    let store = Arc::new(InMemoryScheduleStore::with_templates(Vec::new(), vec![current, behind]).await);

    let service = GenerationService::new(
        Arc::new(T::clock_at(2025, 1, 5)),
        store.clone(),
        store.clone(),
        GenerationPolicy::default(),
        InvoiceNumberSequence::resume("INV", 2024, 5),
    );
    service.run_sweep().await.unwrap();

    let mut numbers: Vec<String> = store
        .invoices()
        .await
        .into_iter()
        .filter_map(|i| i.invoice_number)
        .collect();
    numbers.sort();
    assert_eq!(numbers, vec!["INV-2024-0006", "INV-2025-0001"]);

    let numbering = service.numbering().await;
    assert_eq!(numbering.last_issued(2024), 6);
    assert_eq!(numbering.last_issued(2025), 1);
}

#[tokio::test]
async fn test_report_serializes_camel_case() {
    let store = Arc::new(
        InMemoryScheduleStore::with_templates(vec![RecurringTaskBuilder::new().build()], Vec::new()).await,
    );
    let report = service(T::clock_at(2024, 1, 1), &store).run_sweep().await.unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["today"], "2024-01-01");
    assert_eq!(json["generated"][0]["kind"], "recurring_task");
    assert_eq!(json["generated"][0]["nextDue"], "2024-01-08");
    assert!(json["generated"][0].get("invoiceNumber").is_none());
}
