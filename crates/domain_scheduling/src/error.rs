//! Scheduling domain errors

use thiserror::Error;

use core_kernel::{PortError, RecurrenceError, ValidationErrors};

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("Template is inactive; resume it before generating")]
    InactiveTemplate,

    #[error("Invalid template: {0}")]
    InvalidTemplate(#[from] ValidationErrors),

    #[error("Recurrence error: {0}")]
    Recurrence(#[from] RecurrenceError),

    #[error("Storage error: {0}")]
    Port(#[from] PortError),
}

impl SchedulingError {
    /// True for storage failures worth retrying on the next sweep
    pub fn is_transient(&self) -> bool {
        matches!(self, SchedulingError::Port(e) if e.is_transient())
    }
}
