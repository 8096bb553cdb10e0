//! Test Data Builders
//!
//! Builders for constructing invoices with sensible defaults, so tests only
//! specify the fields they care about.

use chrono::NaiveDate;
use core_kernel::{InvoiceId, LedgerId, Money};
use domain_settlement::{Counterparty, Invoice, InvoiceLine};

use crate::fixtures::date;

/// Builder for draft invoices
pub struct TestInvoiceBuilder {
    id: InvoiceId,
    ledger_id: LedgerId,
    number: String,
    counterparty: Counterparty,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    lines: Vec<InvoiceLine>,
}

impl TestInvoiceBuilder {
    /// Creates a builder dated 2025-01-15, due 30 days later, with no lines
    pub fn new(id: InvoiceId, ledger_id: LedgerId, counterparty: Counterparty) -> Self {
        Self {
            id,
            ledger_id,
            number: "INV-0001".to_string(),
            counterparty,
            issue_date: date(2025, 1, 15),
            due_date: date(2025, 2, 14),
            lines: Vec::new(),
        }
    }

    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub fn issued_on(mut self, issue_date: NaiveDate) -> Self {
        self.issue_date = issue_date;
        if self.due_date < issue_date {
            self.due_date = issue_date;
        }
        self
    }

    pub fn due_on(mut self, due_date: NaiveDate) -> Self {
        self.due_date = due_date;
        self
    }

    pub fn line(mut self, line: InvoiceLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Adds a standard-rated line
    pub fn standard(self, gross: Money) -> Self {
        self.line(InvoiceLine::standard("Standard-rated services", gross).unwrap())
    }

    /// Adds a VAT-exempt line
    pub fn exempt(self, gross: Money) -> Self {
        self.line(InvoiceLine::exempt("Exempt services", gross).unwrap())
    }

    /// Builds the draft invoice; panics on invalid data
    pub fn build(self) -> Invoice {
        self.try_build().unwrap()
    }

    pub fn try_build(self) -> Result<Invoice, domain_settlement::SettlementError> {
        Invoice::draft(
            self.id,
            self.ledger_id,
            self.number,
            self.counterparty,
            self.issue_date,
            self.due_date,
            self.lines,
        )
    }
}
