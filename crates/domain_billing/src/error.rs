//! Billing domain errors

use thiserror::Error;

use core_kernel::{LineItemId, MoneyError, RecurrenceError, ValidationErrors};

use crate::invoice::InvoiceStatus;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Line item not found on the invoice or template
    #[error("Line item not found: {0}")]
    LineItemNotFound(LineItemId),

    /// The invoice cannot move between these statuses
    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    /// The invoice must be numbered before it is sent
    #[error("Invoice has no number")]
    MissingInvoiceNumber,

    /// The invoice no longer accepts edits
    #[error("Invoice in status {0} cannot be edited")]
    NotEditable(InvoiceStatus),

    #[error("Invalid payment: {0}")]
    InvalidPayment(String),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Recurrence error: {0}")]
    Recurrence(#[from] RecurrenceError),

    #[error("Invalid invoice template: {0}")]
    Validation(#[from] ValidationErrors),
}
