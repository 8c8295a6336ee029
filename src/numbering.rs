//! Invoice numbers of the form `INV-YYYYMMDD-NNN`, counted per calendar day.
//!
//! The counters live in the sequence value itself. Hosts that persist
//! numbering between sessions read [`InvoiceNumberSequence::counters`] and
//! seed a new sequence with [`InvoiceNumberSequence::with_counters`].

use std::collections::HashMap;

use chrono::{Local, NaiveDate};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceNumberSequence {
    counters: HashMap<NaiveDate, u32>,
}

impl InvoiceNumberSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from previously issued counts.
    pub fn with_counters(counters: impl IntoIterator<Item = (NaiveDate, u32)>) -> Self {
        Self {
            counters: counters.into_iter().collect(),
        }
    }

    /// Issue the next number for `date`, or `None` once the day's counter
    /// is exhausted. An exhausted counter is left unchanged.
    pub fn next_for(&mut self, date: NaiveDate) -> Option<String> {
        let counter = self.counters.entry(date).or_insert(0);
        *counter = counter.checked_add(1)?;
        Some(format_invoice_number(date, *counter))
    }

    /// Issue the next number for today in local time.
    pub fn next_today(&mut self) -> Option<String> {
        self.next_for(Local::now().date_naive())
    }

    /// How many numbers were issued on `date`.
    pub fn issued_on(&self, date: NaiveDate) -> u32 {
        self.counters.get(&date).copied().unwrap_or(0)
    }

    pub fn counters(&self) -> &HashMap<NaiveDate, u32> {
        &self.counters
    }
}

/// `INV-20240301-007`. Counters past 999 keep all their digits.
pub fn format_invoice_number(date: NaiveDate, counter: u32) -> String {
    format!("INV-{}-{:03}", date.format("%Y%m%d"), counter)
}
