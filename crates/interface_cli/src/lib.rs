//! Command-line generation sweep
//!
//! Loads a [`ScheduleSnapshot`] of recurring tasks and invoice templates,
//! runs one generation sweep over it and produces a [`SweepOutput`] holding
//! the generated records, the advanced templates and the sweep report.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = SweepConfig::from_env()?;
//! run(&config).await?;
//! ```

pub mod config;
pub mod error;
pub mod snapshot;

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use domain_billing::InvoiceNumberSequence;
use domain_scheduling::{GenerationService, InMemoryScheduleStore};

pub use crate::config::{LogFormat, SweepConfig};
pub use crate::error::CliError;
pub use crate::snapshot::{ScheduleSnapshot, SweepOutput};

/// Sweeps a snapshot held in memory
pub async fn sweep_snapshot(config: &SweepConfig, snapshot: ScheduleSnapshot) -> Result<SweepOutput, CliError> {
    let policy = config.policy()?;
    let numbering = snapshot
        .invoice_numbering
        .clone()
        .unwrap_or_else(|| InvoiceNumberSequence::new(config.invoice_number_prefix.clone()));

    let store = Arc::new(
        InMemoryScheduleStore::with_templates(snapshot.recurring_tasks, snapshot.invoice_templates).await,
    );
    let service = GenerationService::new(config.clock(), store.clone(), store.clone(), policy, numbering);

    let report = service.run_sweep().await?;

    Ok(SweepOutput {
        report,
        snapshot: ScheduleSnapshot {
            recurring_tasks: store.recurring_tasks().await,
            invoice_templates: store.invoice_templates().await,
            invoice_numbering: Some(service.numbering().await),
        },
        generated_tasks: store.tasks().await,
        generated_invoices: store.invoices().await,
    })
}

/// Reads the configured input, sweeps it and writes the result
pub async fn run(config: &SweepConfig) -> Result<SweepOutput, CliError> {
    let snapshot = read_snapshot(&config.input_path).await?;
    info!(
        input = %config.input_path.display(),
        recurring_tasks = snapshot.recurring_tasks.len(),
        invoice_templates = snapshot.invoice_templates.len(),
        "Loaded schedule snapshot"
    );

    let output = sweep_snapshot(config, snapshot).await?;
    let json = serde_json::to_string_pretty(&output)?;

    match &config.output_path {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .map_err(|e| CliError::io(path, e))?;
            info!(output = %path.display(), "Wrote sweep result");
        }
        None => println!("{}", json),
    }

    Ok(output)
}

pub async fn read_snapshot(path: &Path) -> Result<ScheduleSnapshot, CliError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CliError::io(path, e))?;
    Ok(serde_json::from_str(&raw)?)
}
