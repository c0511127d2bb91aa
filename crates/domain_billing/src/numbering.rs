//! Invoice numbering
//!
//! Numbers look like `INV-2024-0007`: a prefix, the issue year and a
//! counter that restarts every year. Each year keeps its own counter, so an
//! invoice dated in an earlier year continues that year's run.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::invoice::Invoice;

/// A persisted invoice number counter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceNumberSequence {
    prefix: String,
    /// Last number issued, per issue year
    #[serde(default)]
    issued: BTreeMap<i32, u32>,
}

impl InvoiceNumberSequence {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: BTreeMap::new(),
        }
    }

    /// Resumes a sequence after `last` numbers were issued in `year`
    pub fn resume(prefix: impl Into<String>, year: i32, last: u32) -> Self {
        Self::new(prefix).with_issued(year, last)
    }

    /// Records that `last` numbers were already issued in `year`
    pub fn with_issued(mut self, year: i32, last: u32) -> Self {
        self.issued.insert(year, last);
        self
    }

    /// Last number issued in `year`, zero if none
    pub fn last_issued(&self, year: i32) -> u32 {
        self.issued.get(&year).copied().unwrap_or(0)
    }

    /// Issues the next number for an invoice dated `issue_date`
    pub fn next_number(&mut self, issue_date: NaiveDate) -> String {
        let year = issue_date.year();
        let last = self.issued.entry(year).or_insert(0);
        *last += 1;
        let number = *last;
        format!("{}-{}-{:04}", self.prefix, year, number)
    }

    /// Numbers an invoice unless it already has a number
    pub fn assign(&mut self, invoice: &mut Invoice) {
        if invoice.invoice_number.is_none() {
            let number = self.next_number(invoice.issue_date);
            invoice.assign_number(number);
        }
    }
}

impl Default for InvoiceNumberSequence {
    fn default() -> Self {
        Self::new("INV")
    }
}
