//! Invoice and credit-note posting
//!
//! Posts issued invoices to the Sales or Purchases journal under their
//! number, and sales credit notes under the credit-note number. The
//! reference makes both idempotent: posting the same document twice returns
//! the transaction already in the journal.

use chrono::NaiveDate;
use rust_decimal::RoundingStrategy;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use core_kernel::{InvoiceId, LedgerId, Money};
use domain_ledger::{Account, JournalTransaction, JournalType, LedgerEngine, TransactionRequest};

use crate::config::SettlementConfig;
use crate::engine::configured_account;
use crate::error::SettlementError;
use crate::invoice::{Invoice, InvoiceStatus, Side, VatSplit};
use crate::ports::InvoiceRepository;

pub struct InvoicePosting {
    ledger: Arc<LedgerEngine>,
    invoices: Arc<dyn InvoiceRepository>,
    config: SettlementConfig,
}

impl InvoicePosting {
    pub fn new(
        ledger: Arc<LedgerEngine>,
        invoices: Arc<dyn InvoiceRepository>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            ledger,
            invoices,
            config,
        }
    }

    /// Stores a new invoice
    pub fn register(&self, invoice: &Invoice) -> Result<(), SettlementError> {
        if self
            .invoices
            .find_by_number(invoice.ledger_id, &invoice.number)?
            .is_some()
        {
            return Err(SettlementError::validation(format!(
                "Invoice number {} already exists",
                invoice.number
            )));
        }
        self.invoices.save(invoice)?;
        Ok(())
    }

    /// Posts an invoice to its journal
    ///
    /// Draft invoices become issued once the posting succeeds. Sales invoices post
    /// `Dr receivable gross / Cr revenue net / Cr VAT collected vat`;
    /// purchase invoices post
    /// `Dr expense net / Dr VAT deductible vat / Cr payable gross`.
    #[instrument(skip(self), fields(invoice = %invoice_id))]
    pub fn post_invoice(&self, invoice_id: InvoiceId) -> Result<JournalTransaction, SettlementError> {
        let invoice = self.invoice(invoice_id)?;
        let journal = journal_for(invoice.side());

        if let Some(existing) = self.ledger.find_transaction(journal, &invoice.number)? {
            debug!(transaction_id = %existing.id, "Invoice already posted");
            if invoice.status == InvoiceStatus::Draft {
                self.invoices.save(&invoice.issue()?)?;
            }
            return Ok(existing);
        }

        let was_draft = invoice.status == InvoiceStatus::Draft;
        let invoice = match invoice.status {
            InvoiceStatus::Draft => invoice.issue()?,
            InvoiceStatus::Issued => invoice,
            other => {
                return Err(SettlementError::invalid_state(format!(
                    "Only draft or issued invoices can be posted; invoice {} is {}",
                    invoice.number, other
                )))
            }
        };

        let split = invoice.vat_split(self.config.vat_rate);
        let accounts = &self.config.accounts;
        let request = TransactionRequest::new(journal, invoice.number.clone(), invoice.issue_date);
        let request = match invoice.side() {
            Side::Receivable => {
                let receivable = self.account(invoice.ledger_id, "Receivable", &accounts.receivable)?;
                let revenue = self.account(invoice.ledger_id, "Revenue", &accounts.revenue)?;
                let vat = self.account(invoice.ledger_id, "VAT collected", &accounts.vat_collected)?;
                let request = request
                    .described(format!("Invoice {}", invoice.number))
                    .debit(receivable.id, split.gross)
                    .credit(revenue.id, split.net);
                if split.vat.is_positive() {
                    request.credit(vat.id, split.vat)
                } else {
                    request
                }
            }
            Side::Payable => {
                let payable = self.account(invoice.ledger_id, "Payable", &accounts.payable)?;
                let expense = self.account(invoice.ledger_id, "Expense", &accounts.expense)?;
                let vat = self.account(invoice.ledger_id, "VAT deductible", &accounts.vat_deductible)?;
                let request = request
                    .described(format!("Purchase invoice {}", invoice.number))
                    .debit(expense.id, split.net);
                let request = if split.vat.is_positive() {
                    request.debit(vat.id, split.vat)
                } else {
                    request
                };
                request.credit(payable.id, split.gross)
            }
        };

        let transaction = self.ledger.post_journal_transaction(request)?;
        if was_draft {
            self.invoices.save(&invoice)?;
        }
        info!(
            transaction_id = %transaction.id,
            gross = %split.gross,
            net = %split.net,
            vat = %split.vat,
            "Posted invoice"
        );
        Ok(transaction)
    }

    /// Credits a posted sales invoice in full
    #[instrument(skip(self), fields(invoice = %invoice_id, credit_note = %credit_note_number))]
    pub fn issue_full_credit_note(
        &self,
        invoice_id: InvoiceId,
        credit_note_number: &str,
        issue_date: NaiveDate,
    ) -> Result<JournalTransaction, SettlementError> {
        let invoice = self.creditable_invoice(invoice_id, credit_note_number)?;
        if let Some(existing) = self.ledger.find_transaction(JournalType::Sales, credit_note_number)? {
            debug!(transaction_id = %existing.id, "Credit note already posted");
            return Ok(existing);
        }

        let split = invoice.vat_split(self.config.vat_rate);
        self.post_credit_note(
            &invoice,
            credit_note_number,
            format!("Credit note {} for invoice {}", credit_note_number, invoice.number),
            issue_date,
            split,
        )
    }

    /// Credits part of a posted sales invoice
    ///
    /// The net share follows the invoice's own net/gross ratio:
    /// `ratio = round_half_up(net / gross, 12)`,
    /// `net = round_half_up(gross_to_credit * ratio, 2)`.
    #[instrument(skip(self), fields(invoice = %invoice_id, credit_note = %credit_note_number))]
    pub fn issue_partial_credit_note(
        &self,
        invoice_id: InvoiceId,
        credit_note_number: &str,
        issue_date: NaiveDate,
        gross_to_credit: Money,
    ) -> Result<JournalTransaction, SettlementError> {
        if !gross_to_credit.is_positive() {
            return Err(SettlementError::validation("Gross amount to credit must be positive"));
        }
        let invoice = self.creditable_invoice(invoice_id, credit_note_number)?;
        if let Some(existing) = self.ledger.find_transaction(JournalType::Sales, credit_note_number)? {
            debug!(transaction_id = %existing.id, "Credit note already posted");
            return Ok(existing);
        }
        if gross_to_credit.currency() != invoice.currency() {
            return Err(SettlementError::validation("Currency mismatch for credit note"));
        }

        let full = invoice.vat_split(self.config.vat_rate);
        if !full.gross.is_positive() {
            return Err(SettlementError::invalid_state("Invoice total must be positive"));
        }
        if gross_to_credit.checked_cmp(&full.gross)?.is_gt() {
            return Err(SettlementError::validation("Cannot credit more than invoice total"));
        }

        let ratio = (full.net.amount() / full.gross.amount())
            .round_dp_with_strategy(12, RoundingStrategy::MidpointAwayFromZero);
        let net = (gross_to_credit.amount() * ratio)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let net = Money::new(net, invoice.currency());
        let split = VatSplit {
            gross: gross_to_credit,
            net,
            vat: gross_to_credit.checked_sub(&net)?,
        };

        self.post_credit_note(
            &invoice,
            credit_note_number,
            format!("Partial credit note {} for invoice {}", credit_note_number, invoice.number),
            issue_date,
            split,
        )
    }

    fn post_credit_note(
        &self,
        invoice: &Invoice,
        credit_note_number: &str,
        description: String,
        issue_date: NaiveDate,
        split: VatSplit,
    ) -> Result<JournalTransaction, SettlementError> {
        let accounts = &self.config.accounts;
        let receivable = self.account(invoice.ledger_id, "Receivable", &accounts.receivable)?;
        let revenue = self.account(invoice.ledger_id, "Revenue", &accounts.revenue)?;
        let vat = self.account(invoice.ledger_id, "VAT collected", &accounts.vat_collected)?;

        let request = TransactionRequest::new(JournalType::Sales, credit_note_number, issue_date)
            .described(description)
            .debit(revenue.id, split.net);
        let request = if split.vat.is_positive() {
            request.debit(vat.id, split.vat)
        } else {
            request
        };
        let transaction = self
            .ledger
            .post_journal_transaction(request.credit(receivable.id, split.gross))?;

        info!(transaction_id = %transaction.id, gross = %split.gross, "Posted credit note");
        Ok(transaction)
    }

    fn creditable_invoice(
        &self,
        invoice_id: InvoiceId,
        credit_note_number: &str,
    ) -> Result<Invoice, SettlementError> {
        if credit_note_number.trim().is_empty() {
            return Err(SettlementError::validation("Credit note number is required"));
        }
        let invoice = self.invoice(invoice_id)?;
        if invoice.side() != Side::Receivable {
            return Err(SettlementError::validation(format!(
                "Credit notes apply to sales invoices; {} is a purchase invoice",
                invoice.number
            )));
        }
        if self
            .ledger
            .find_transaction(JournalType::Sales, &invoice.number)?
            .is_none()
        {
            return Err(SettlementError::InvoiceNotPosted(invoice.number));
        }
        Ok(invoice)
    }

    fn invoice(&self, invoice_id: InvoiceId) -> Result<Invoice, SettlementError> {
        self.invoices
            .find_by_id(invoice_id)?
            .ok_or_else(|| SettlementError::InvoiceNotFound(invoice_id.to_string()))
    }

    fn account(&self, ledger_id: LedgerId, role: &'static str, code: &str) -> Result<Account, SettlementError> {
        configured_account(&self.ledger, ledger_id, role, code)
    }
}

fn journal_for(side: Side) -> JournalType {
    match side {
        Side::Receivable => JournalType::Sales,
        Side::Payable => JournalType::Purchases,
    }
}
