//! Core Kernel - shared building blocks for the agency operations domains
//!
//! This crate provides the types every domain crate leans on:
//! - Money and percentage rates with precise decimal arithmetic
//! - Calendar handling, timezones and an injectable clock
//! - Recurrence rules and next-occurrence calculation
//! - Strongly-typed identifiers
//! - Port error types for storage collaborators
//! - Violation collection for template validation

pub mod money;
pub mod temporal;
pub mod recurrence;
pub mod identifiers;
pub mod ports;
pub mod validation;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Clock, SystemClock, FixedClock, DateRange, Timezone, TemporalError};
pub use recurrence::{
    Frequency, RecurrenceRule, RecurrenceOptions, RecurrenceError, Recurring,
    next_occurrence, upcoming,
};
pub use identifiers::{
    ClientId, ProjectId, TeamMemberId, TaskId, RecurringTaskId,
    InvoiceId, InvoiceTemplateId, LineItemId,
};
pub use ports::{PortError, DomainPort};
pub use validation::{ValidationErrors, Violation};
