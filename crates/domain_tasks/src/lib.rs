//! Task Domain
//!
//! This crate covers the task side of the agency dashboard: concrete
//! [`Task`]s assigned to team members, and [`RecurringTask`] templates that
//! produce a new task each time they fall due.
//!
//! # Task Lifecycle
//!
//! ```text
//! Pending -> InProgress -> Completed
//!    │           │             │
//!    └───────────┴─> Cancelled  └─> reopen -> Pending
//! ```

pub mod task;
pub mod recurring;
pub mod error;

pub use task::{Task, TaskStatus, TaskPriority};
pub use recurring::RecurringTask;
pub use error::TaskError;
