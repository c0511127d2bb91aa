//! Billing Domain - invoices, line items and recurring invoice templates
//!
//! This crate keeps the money side of the agency dashboard consistent:
//!
//! - [`LineItemCalculator`] derives line amounts and invoice totals
//! - [`Invoice`] carries a concrete bill through draft, sent, paid and overdue
//! - [`RecurringInvoiceTemplate`] describes a bill that is issued on a schedule
//!   and snapshots itself into a new invoice each time it falls due
//! - [`InvoiceNumberSequence`] numbers generated invoices
//!
//! # Totals
//!
//! ```text
//! amount    = round2(quantity × rate)          per line item
//! subtotal  = Σ amount
//! taxAmount = subtotal × taxRate / 100
//! total     = subtotal + taxAmount − discount  (not clamped at zero)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{Invoice, LineItem};
//!
//! let invoice = Invoice::new(client_id, issue_date, due_date, Currency::USD, now)
//!     .with_item(LineItem::new("Consulting", dec!(2), dec!(50)))
//!     .with_item(LineItem::new("Setup", dec!(1), dec!(100)))
//!     .with_tax_rate(Rate::from_percentage(dec!(10)))
//!     .with_discount(Money::new(dec!(20), Currency::USD));
//!
//! assert_eq!(invoice.total.amount(), dec!(200));
//! ```

pub mod calculator;
pub mod line_item;
pub mod invoice;
pub mod recurring;
pub mod numbering;
pub mod error;

pub use calculator::{Billable, InvoiceTotals, LineItemCalculator};
pub use line_item::{LineItem, LineItemUpdate, MAX_LINE_QUANTITY, MAX_LINE_RATE};
pub use invoice::{Invoice, InvoiceStatus};
pub use recurring::{RecurringInvoiceTemplate, RecurrenceInterval, DEFAULT_PAYMENT_TERMS_DAYS};
pub use numbering::InvoiceNumberSequence;
pub use error::BillingError;
