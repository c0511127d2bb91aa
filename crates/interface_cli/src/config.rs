//! Sweep configuration

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use core_kernel::{Clock, FixedClock, RecurrenceOptions, SystemClock, Timezone};
use domain_scheduling::GenerationPolicy;

use crate::error::CliError;

/// Shape of log lines written to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event, for log shippers
    Json,
}

/// Sweep configuration, read from `SWEEP_*` environment variables
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
    /// IANA name of the agency timezone
    pub timezone: String,
    pub honor_days_of_week: bool,
    pub deactivate_past_end_date: bool,
    /// Prefix for numbers given to generated invoices
    pub invoice_number_prefix: String,
    /// Schedule snapshot to read
    pub input_path: PathBuf,
    /// Where to write the result; stdout when unset
    pub output_path: Option<PathBuf>,
    /// Runs the sweep as of this instant instead of the system time
    pub now: Option<DateTime<Utc>>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            timezone: "UTC".to_string(),
            honor_days_of_week: true,
            deactivate_past_end_date: true,
            invoice_number_prefix: "INV".to_string(),
            input_path: PathBuf::from("schedule.json"),
            output_path: None,
            now: None,
        }
    }
}

impl SweepConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("SWEEP").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn timezone(&self) -> Result<Timezone, CliError> {
        Ok(self.timezone.parse()?)
    }

    pub fn policy(&self) -> Result<GenerationPolicy, CliError> {
        Ok(GenerationPolicy {
            recurrence: RecurrenceOptions {
                honor_days_of_week: self.honor_days_of_week,
            },
            deactivate_past_end_date: self.deactivate_past_end_date,
            timezone: self.timezone()?,
        })
    }

    /// A frozen clock when `now` is configured, the system clock otherwise
    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.now {
            Some(instant) => Arc::new(FixedClock::new(instant)),
            None => Arc::new(SystemClock),
        }
    }
}
