//! Invoices
//!
//! Sales invoices (owed by a customer) and purchase invoices (owed to a
//! supplier) share one aggregate; the counterparty decides the side.
//! Status transitions consume the invoice and return the new value.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Currency, CustomerId, InvoiceId, LedgerId, Money, Rate, SupplierId};
use crate::error::SettlementError;

/// Which side of the balance sheet an invoice settles against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Money owed to us by a customer
    Receivable,
    /// Money we owe a supplier
    Payable,
}

/// The other party of an invoice or stored credit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Counterparty {
    Customer(CustomerId),
    Supplier(SupplierId),
}

impl Counterparty {
    pub fn side(&self) -> Side {
        match self {
            Counterparty::Customer(_) => Side::Receivable,
            Counterparty::Supplier(_) => Side::Payable,
        }
    }
}

impl fmt::Display for Counterparty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counterparty::Customer(id) => write!(f, "{}", id),
            Counterparty::Supplier(id) => write!(f, "{}", id),
        }
    }
}

/// VAT treatment of an invoice line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxCategory {
    /// Gross amount includes VAT at the configured rate
    Standard,
    Exempt,
}

/// A line on an invoice; `amount` is the gross amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub description: String,
    pub amount: Money,
    pub tax_category: TaxCategory,
}

impl InvoiceLine {
    pub fn new(
        description: impl Into<String>,
        amount: Money,
        tax_category: TaxCategory,
    ) -> Result<Self, SettlementError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(SettlementError::validation("Line description is required"));
        }
        if !amount.is_positive() {
            return Err(SettlementError::validation("Line amount must be positive"));
        }
        Ok(Self {
            description,
            amount,
            tax_category,
        })
    }

    pub fn standard(description: impl Into<String>, amount: Money) -> Result<Self, SettlementError> {
        Self::new(description, amount, TaxCategory::Standard)
    }

    pub fn exempt(description: impl Into<String>, amount: Money) -> Result<Self, SettlementError> {
        Self::new(description, amount, TaxCategory::Exempt)
    }
}

/// Invoice status
///
/// `Draft -> Issued -> {PartiallyPaid -> Paid}`, `Draft -> Cancelled`.
/// `Paid` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    /// Invoice is being drafted
    Draft,
    /// Invoice has been issued
    Issued,
    /// Partial payment received
    PartiallyPaid,
    /// Fully paid
    Paid,
    /// Cancelled before issue
    Cancelled,
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Issued => "ISSUED",
            InvoiceStatus::PartiallyPaid => "PARTIALLY_PAID",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// Gross amount of an invoice split into net and VAT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatSplit {
    pub gross: Money,
    pub net: Money,
    pub vat: Money,
}

/// A sales or purchase invoice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub ledger_id: LedgerId,
    /// Invoice number (human-readable); doubles as the posting reference
    pub number: String,
    pub counterparty: Counterparty,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub lines: Vec<InvoiceLine>,
    /// Sum of the line amounts
    pub total: Money,
    pub status: InvoiceStatus,
}

impl Invoice {
    /// Creates a draft invoice
    ///
    /// # Errors
    ///
    /// Validation error on a blank number, a due date before the issue date,
    /// no lines, or lines in different currencies.
    pub fn draft(
        id: InvoiceId,
        ledger_id: LedgerId,
        number: impl Into<String>,
        counterparty: Counterparty,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        lines: Vec<InvoiceLine>,
    ) -> Result<Self, SettlementError> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(SettlementError::validation("Invoice number is required"));
        }
        if due_date < issue_date {
            return Err(SettlementError::validation(format!(
                "Due date {} cannot be before issue date {}",
                due_date, issue_date
            )));
        }
        let Some(first) = lines.first() else {
            return Err(SettlementError::validation(
                "Invoice must have at least one line",
            ));
        };
        let total = Money::sum(lines.iter().map(|l| &l.amount), first.amount.currency())?;

        Ok(Self {
            id,
            ledger_id,
            number,
            counterparty,
            issue_date,
            due_date,
            lines,
            total,
            status: InvoiceStatus::Draft,
        })
    }

    pub fn side(&self) -> Side {
        self.counterparty.side()
    }

    pub fn currency(&self) -> Currency {
        self.total.currency()
    }

    /// True while payments and credits may be applied
    pub fn is_settleable(&self) -> bool {
        matches!(self.status, InvoiceStatus::Issued | InvoiceStatus::PartiallyPaid)
    }

    /// Splits the gross total into net and VAT
    ///
    /// Each `Standard` line is split on its own with
    /// `net = round_half_up(gross / (1 + rate), 2)`; `Exempt` lines are all
    /// net.
    pub fn vat_split(&self, rate: Rate) -> VatSplit {
        let currency = self.currency();
        let divisor = Decimal::ONE + rate.as_decimal();
        let (net, vat) = self
            .lines
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(net, vat), line| {
                let gross = line.amount.amount();
                if line.tax_category == TaxCategory::Standard && !rate.is_zero() {
                    let line_net = (gross / divisor)
                        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                    (net + line_net, vat + (gross - line_net))
                } else {
                    (net + gross, vat)
                }
            });

        VatSplit {
            gross: self.total,
            net: Money::new(net, currency),
            vat: Money::new(vat, currency),
        }
    }

    /// `Draft -> Issued`
    pub fn issue(self) -> Result<Self, SettlementError> {
        self.transition(InvoiceStatus::Issued, &[InvoiceStatus::Draft])
    }

    /// `Issued | PartiallyPaid -> Paid`
    pub fn mark_paid(self) -> Result<Self, SettlementError> {
        self.transition(
            InvoiceStatus::Paid,
            &[InvoiceStatus::Issued, InvoiceStatus::PartiallyPaid],
        )
    }

    /// `Issued | PartiallyPaid -> PartiallyPaid`
    pub fn mark_partially_paid(self) -> Result<Self, SettlementError> {
        self.transition(
            InvoiceStatus::PartiallyPaid,
            &[InvoiceStatus::Issued, InvoiceStatus::PartiallyPaid],
        )
    }

    /// `Draft -> Cancelled`
    pub fn cancel(self) -> Result<Self, SettlementError> {
        self.transition(InvoiceStatus::Cancelled, &[InvoiceStatus::Draft])
    }

    fn transition(self, to: InvoiceStatus, from: &[InvoiceStatus]) -> Result<Self, SettlementError> {
        if !from.contains(&self.status) {
            return Err(SettlementError::invalid_state(format!(
                "Invoice {} cannot move from {} to {}",
                self.number, self.status, to
            )));
        }
        Ok(Self { status: to, ..self })
    }
}
