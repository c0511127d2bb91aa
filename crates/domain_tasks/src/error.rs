//! Task domain errors

use thiserror::Error;

use core_kernel::ValidationErrors;

use crate::task::TaskStatus;

/// Errors that can occur in the task domain
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: TaskStatus, to: TaskStatus },

    #[error("Invalid recurring task: {0}")]
    Validation(#[from] ValidationErrors),
}
