//! Settlement engine
//!
//! Pays down invoices and consumes stored credit against them, for both the
//! receivable (customer) and payable (supplier) side. Every entry point is
//! wrapped once by the [`IdempotencyExecutor`] and returns the identifier of
//! the journal transaction it posted; a replay returns the same identifier.
//!
//! | operation | journal | receivable legs | payable legs |
//! |---|---|---|---|
//! | payment | Bank | Dr bank, Cr AR, Cr advance (excess) | Dr AP, Dr advance (excess), Cr bank |
//! | apply credit | Adjustment | Dr advance, Cr AR | Dr AP, Cr advance |
//! | batch | Bank | Dr bank, Cr AR per allocation | Dr AP per allocation, Cr bank |
//! | unallocated | Bank | Dr bank, Cr advance | Dr advance, Cr bank |
//!
//! Ledger postings are made before any invoice, payment or credit record is
//! written, so a rejected posting leaves settlement state untouched.

use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{
    Clock, CommandId, Currency, IdGenerator, InvoiceId, LedgerId, Money, TransactionId,
};
use domain_ledger::{Account, JournalType, LedgerEngine, LedgerError, TransactionRequest};

use crate::config::SettlementConfig;
use crate::credit::{plan_consumption, StoredCredit};
use crate::error::SettlementError;
use crate::idempotency::IdempotencyExecutor;
use crate::invoice::{Counterparty, Invoice, Side};
use crate::payment::Payment;
use crate::ports::{CreditRepository, InvoiceRepository, PaymentRepository};

/// Storage collaborators of the settlement engine
#[derive(Clone)]
pub struct SettlementRepositories {
    pub invoices: Arc<dyn InvoiceRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub credits: Arc<dyn CreditRepository>,
}

/// One invoice's share of a batch payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentAllocation {
    pub invoice_id: InvoiceId,
    pub amount: Money,
}

impl PaymentAllocation {
    pub fn new(invoice_id: InvoiceId, amount: Money) -> Self {
        Self { invoice_id, amount }
    }
}

/// Account codes and labels of one side of the book
struct Book<'a> {
    settlement: &'a str,
    settlement_role: &'static str,
    advance: &'a str,
    advance_role: &'static str,
    sentinel: &'a str,
    tag: &'static str,
}

pub struct SettlementEngine {
    ledger: Arc<LedgerEngine>,
    repos: SettlementRepositories,
    executor: Arc<IdempotencyExecutor>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    config: SettlementConfig,
}

impl SettlementEngine {
    pub fn new(
        ledger: Arc<LedgerEngine>,
        repos: SettlementRepositories,
        executor: Arc<IdempotencyExecutor>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        config: SettlementConfig,
    ) -> Self {
        Self {
            ledger,
            repos,
            executor,
            clock,
            ids,
            config,
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    /// Records a bank payment against an invoice
    ///
    /// With no `amount` the remaining balance is paid. An amount above the
    /// remaining balance is allowed: the excess is posted to the advance
    /// account and stored as a credit for the counterparty.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` unless the invoice is issued or partially paid
    /// - `AlreadySettled` when nothing remains to pay
    /// - Validation error for a non-positive amount or another currency
    #[instrument(skip(self), fields(command = %command_id, invoice = %invoice_id))]
    pub fn record_payment(
        &self,
        command_id: CommandId,
        invoice_id: InvoiceId,
        bank_account_code: &str,
        amount: Option<Money>,
        payment_date: NaiveDate,
    ) -> Result<TransactionId, SettlementError> {
        self.executor.run(
            command_id,
            || self.pay(command_id, invoice_id, bank_account_code, amount, payment_date),
            |record| record.parse_result(),
        )
    }

    fn pay(
        &self,
        command_id: CommandId,
        invoice_id: InvoiceId,
        bank_account_code: &str,
        amount: Option<Money>,
        payment_date: NaiveDate,
    ) -> Result<TransactionId, SettlementError> {
        let invoice = self.settleable_invoice(invoice_id)?;
        let remaining = self.outstanding(&invoice)?;

        let total_paid = match amount {
            None => remaining,
            Some(amount) => {
                ensure_currency(&amount, invoice.currency(), "Payment currency must match invoice currency")?;
                ensure_positive(&amount, "Payment amount must be positive")?;
                amount
            }
        };
        let applied = total_paid.min(&remaining)?;
        let excess = total_paid.checked_sub(&applied)?;

        let book = self.book(invoice.side());
        let bank = self.account(invoice.ledger_id, "Bank", bank_account_code)?;
        let settlement = self.account(invoice.ledger_id, book.settlement_role, book.settlement)?;

        let reference = format!("BANK-PAY-{}-{}", invoice.number, command_id.as_uuid());
        let mut request = TransactionRequest::new(JournalType::Bank, reference, payment_date)
            .described(match invoice.side() {
                Side::Receivable => format!("Payment of invoice {}", invoice.number),
                Side::Payable => format!("Payment of purchase invoice {}", invoice.number),
            });
        request = match invoice.side() {
            Side::Receivable => request.debit(bank.id, total_paid).credit(settlement.id, applied),
            Side::Payable => request.debit(settlement.id, applied),
        };
        if excess.is_positive() {
            let advance = self.account(invoice.ledger_id, book.advance_role, book.advance)?;
            request = match invoice.side() {
                Side::Receivable => request.credit(advance.id, excess),
                Side::Payable => request.debit(advance.id, excess),
            };
        }
        if invoice.side() == Side::Payable {
            request = request.credit(bank.id, total_paid);
        }

        let transaction = self.ledger.post_journal_transaction(request)?;

        if excess.is_positive() {
            self.store_credit(invoice.counterparty, excess, command_id)?;
        }
        self.record_settlement(invoice, applied, remaining, payment_date, bank_account_code, command_id)?;

        info!(
            transaction_id = %transaction.id,
            applied = %applied,
            excess = %excess,
            "Recorded payment"
        );
        Ok(transaction.id)
    }

    /// Applies stored credit (customer) or advance (supplier) to an invoice
    ///
    /// At most the remaining balance is applied. The open pool is checked
    /// as a whole before any credit is consumed; credits are then consumed
    /// oldest first.
    #[instrument(skip(self), fields(command = %command_id, invoice = %invoice_id))]
    pub fn apply_credit(
        &self,
        command_id: CommandId,
        invoice_id: InvoiceId,
        amount: Money,
        date: NaiveDate,
    ) -> Result<TransactionId, SettlementError> {
        self.executor.run(
            command_id,
            || self.consume_credit(command_id, invoice_id, amount, date),
            |record| record.parse_result(),
        )
    }

    fn consume_credit(
        &self,
        command_id: CommandId,
        invoice_id: InvoiceId,
        amount: Money,
        date: NaiveDate,
    ) -> Result<TransactionId, SettlementError> {
        ensure_positive(&amount, "Amount must be positive")?;
        let invoice = self.settleable_invoice(invoice_id)?;
        ensure_currency(&amount, invoice.currency(), "Currency mismatch")?;
        let remaining = self.outstanding(&invoice)?;
        let to_apply = amount.min(&remaining)?;

        let pool = self.open_credits_in(&invoice.counterparty, invoice.currency())?;
        let consumed = match plan_consumption(pool, to_apply) {
            Ok(consumed) => consumed,
            Err(e) => {
                warn!(error = %e, counterparty = %invoice.counterparty, "Credit application refused");
                return Err(e);
            }
        };

        let book = self.book(invoice.side());
        let settlement = self.account(invoice.ledger_id, book.settlement_role, book.settlement)?;
        let advance = self.account(invoice.ledger_id, book.advance_role, book.advance)?;

        let (reference, description, (debit_account, credit_account)) = match invoice.side() {
            Side::Receivable => (
                format!("CREDIT-APPLY-{}-{}", invoice.number, command_id.as_uuid()),
                format!("Apply customer credit to invoice {}", invoice.number),
                (advance.id, settlement.id),
            ),
            Side::Payable => (
                format!("ADV-APPLY-{}-{}", invoice.number, command_id.as_uuid()),
                format!("Apply supplier advance to purchase invoice {}", invoice.number),
                (settlement.id, advance.id),
            ),
        };
        let transaction = self.ledger.post_journal_transaction(
            TransactionRequest::new(JournalType::Adjustment, reference, date)
                .described(description)
                .debit(debit_account, to_apply)
                .credit(credit_account, to_apply),
        )?;

        for credit in &consumed {
            self.repos.credits.save(credit)?;
        }
        self.record_settlement(invoice, to_apply, remaining, date, book.sentinel, command_id)?;

        info!(
            transaction_id = %transaction.id,
            applied = %to_apply,
            credits_touched = consumed.len(),
            "Applied stored credit"
        );
        Ok(transaction.id)
    }

    /// Records one bank movement settling several invoices of one
    /// counterparty
    ///
    /// Each allocation must be positive, in the batch currency and at most
    /// its invoice's remaining balance; a batch never creates credit.
    #[instrument(skip(self, allocations), fields(command = %command_id, allocations = allocations.len()))]
    pub fn record_batch_payment(
        &self,
        command_id: CommandId,
        bank_account_code: &str,
        payment_date: NaiveDate,
        allocations: &[PaymentAllocation],
    ) -> Result<TransactionId, SettlementError> {
        self.executor.run(
            command_id,
            || self.pay_batch(command_id, bank_account_code, payment_date, allocations),
            |record| record.parse_result(),
        )
    }

    fn pay_batch(
        &self,
        command_id: CommandId,
        bank_account_code: &str,
        payment_date: NaiveDate,
        allocations: &[PaymentAllocation],
    ) -> Result<TransactionId, SettlementError> {
        let Some(first) = allocations.first() else {
            return Err(SettlementError::validation("At least one allocation is required"));
        };
        let currency = first.amount.currency();

        let mut seen = HashSet::new();
        let mut settled: Vec<(Invoice, Money, Money)> = Vec::with_capacity(allocations.len());
        for allocation in allocations {
            if !seen.insert(allocation.invoice_id) {
                return Err(SettlementError::validation(format!(
                    "Invoice {} is allocated more than once",
                    allocation.invoice_id
                )));
            }
            ensure_positive(&allocation.amount, "Allocation amount must be positive")?;
            ensure_currency(&allocation.amount, currency, "Multiple currencies not supported in batch payment")?;

            let invoice = self.settleable_invoice(allocation.invoice_id)?;
            if let Some((head, _, _)) = settled.first() {
                if head.counterparty != invoice.counterparty {
                    return Err(SettlementError::validation(
                        "All invoices of a batch must belong to the same counterparty",
                    ));
                }
            }
            ensure_currency(&allocation.amount, invoice.currency(), "Allocation currency must match invoice currency")?;

            let remaining = self.outstanding(&invoice)?;
            if allocation.amount.checked_cmp(&remaining)?.is_gt() {
                return Err(SettlementError::validation(format!(
                    "Allocation exceeds remaining for invoice {}",
                    invoice.number
                )));
            }
            settled.push((invoice, allocation.amount, remaining));
        }

        let (ledger_id, side) = match settled.first() {
            Some((invoice, _, _)) => (invoice.ledger_id, invoice.side()),
            None => return Err(SettlementError::validation("At least one allocation is required")),
        };
        let total = Money::sum(settled.iter().map(|(_, amount, _)| amount), currency)?;

        let book = self.book(side);
        let bank = self.account(ledger_id, "Bank", bank_account_code)?;
        let settlement = self.account(ledger_id, book.settlement_role, book.settlement)?;

        let reference = format!("BANK-BATCH-{}-{}", book.tag, command_id.as_uuid());
        let mut request = TransactionRequest::new(JournalType::Bank, reference, payment_date);
        request = match side {
            Side::Receivable => settled
                .iter()
                .fold(request.described("Customer batch payment").debit(bank.id, total), |r, (_, amount, _)| {
                    r.credit(settlement.id, *amount)
                }),
            Side::Payable => settled
                .iter()
                .fold(request.described("Supplier batch payment"), |r, (_, amount, _)| {
                    r.debit(settlement.id, *amount)
                })
                .credit(bank.id, total),
        };
        let transaction = self.ledger.post_journal_transaction(request)?;

        let count = settled.len();
        for (invoice, amount, remaining) in settled {
            self.record_settlement(invoice, amount, remaining, payment_date, bank_account_code, command_id)?;
        }

        info!(transaction_id = %transaction.id, total = %total, invoices = count, "Recorded batch payment");
        Ok(transaction.id)
    }

    /// Records cash received from (or paid to) a counterparty with no
    /// invoice; the full amount becomes a stored credit
    #[instrument(skip(self), fields(command = %command_id, counterparty = %counterparty))]
    pub fn record_unallocated_payment(
        &self,
        command_id: CommandId,
        ledger_id: LedgerId,
        counterparty: Counterparty,
        bank_account_code: &str,
        amount: Money,
        date: NaiveDate,
    ) -> Result<TransactionId, SettlementError> {
        self.executor.run(
            command_id,
            || self.receive_advance(command_id, ledger_id, counterparty, bank_account_code, amount, date),
            |record| record.parse_result(),
        )
    }

    fn receive_advance(
        &self,
        command_id: CommandId,
        ledger_id: LedgerId,
        counterparty: Counterparty,
        bank_account_code: &str,
        amount: Money,
        date: NaiveDate,
    ) -> Result<TransactionId, SettlementError> {
        ensure_positive(&amount, "Amount must be positive")?;

        let side = counterparty.side();
        let book = self.book(side);
        let bank = self.account(ledger_id, "Bank", bank_account_code)?;
        let advance = self.account(ledger_id, book.advance_role, book.advance)?;
        ensure_currency(&amount, bank.currency, "Bank currency mismatch")?;
        ensure_currency(&amount, advance.currency, "Advance currency mismatch")?;

        let reference = format!("BANK-ADV-{}-{}", book.tag, command_id.as_uuid());
        let request = TransactionRequest::new(JournalType::Bank, reference, date);
        let request = match side {
            Side::Receivable => request
                .described("Unallocated customer payment (advance)")
                .debit(bank.id, amount)
                .credit(advance.id, amount),
            Side::Payable => request
                .described("Unallocated supplier payment (advance)")
                .debit(advance.id, amount)
                .credit(bank.id, amount),
        };
        let transaction = self.ledger.post_journal_transaction(request)?;

        self.store_credit(counterparty, amount, command_id)?;

        info!(transaction_id = %transaction.id, amount = %amount, "Recorded unallocated payment");
        Ok(transaction.id)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn invoice(&self, invoice_id: InvoiceId) -> Result<Invoice, SettlementError> {
        self.repos
            .invoices
            .find_by_id(invoice_id)?
            .ok_or_else(|| SettlementError::InvoiceNotFound(invoice_id.to_string()))
    }

    pub fn payments(&self, invoice_id: InvoiceId) -> Result<Vec<Payment>, SettlementError> {
        Ok(self.repos.payments.find_by_invoice(invoice_id)?)
    }

    /// Invoice total minus everything already applied to it
    pub fn remaining_balance(&self, invoice_id: InvoiceId) -> Result<Money, SettlementError> {
        let invoice = self.invoice(invoice_id)?;
        self.outstanding(&invoice)
    }

    /// Open credits of a counterparty, oldest first
    pub fn open_credits(&self, counterparty: &Counterparty) -> Result<Vec<StoredCredit>, SettlementError> {
        Ok(self.repos.credits.find_open_by_counterparty(counterparty)?)
    }

    /// Total open credit of a counterparty in one currency
    pub fn available_credit(
        &self,
        counterparty: &Counterparty,
        currency: Currency,
    ) -> Result<Money, SettlementError> {
        let credits = self.open_credits_in(counterparty, currency)?;
        Ok(Money::sum(credits.iter().map(|c| &c.remaining), currency)?)
    }

    fn open_credits_in(
        &self,
        counterparty: &Counterparty,
        currency: Currency,
    ) -> Result<Vec<StoredCredit>, SettlementError> {
        Ok(self
            .open_credits(counterparty)?
            .into_iter()
            .filter(|c| c.remaining.currency() == currency)
            .collect())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn book(&self, side: Side) -> Book<'_> {
        let accounts = &self.config.accounts;
        match side {
            Side::Receivable => Book {
                settlement: &accounts.receivable,
                settlement_role: "Receivable",
                advance: &accounts.customer_advance,
                advance_role: "Customer advances",
                sentinel: &self.config.credit_sentinel,
                tag: "CUST",
            },
            Side::Payable => Book {
                settlement: &accounts.payable,
                settlement_role: "Payable",
                advance: &accounts.supplier_advance,
                advance_role: "Supplier advances",
                sentinel: &self.config.advance_sentinel,
                tag: "SUP",
            },
        }
    }

    fn account(&self, ledger_id: LedgerId, role: &'static str, code: &str) -> Result<Account, SettlementError> {
        configured_account(&self.ledger, ledger_id, role, code)
    }

    fn settleable_invoice(&self, invoice_id: InvoiceId) -> Result<Invoice, SettlementError> {
        let invoice = self.invoice(invoice_id)?;
        if !invoice.is_settleable() {
            return Err(SettlementError::invalid_state(format!(
                "Only issued or partially paid invoices can be settled; invoice {} is {}",
                invoice.number, invoice.status
            )));
        }
        Ok(invoice)
    }

    /// Remaining balance, failing with `AlreadySettled` when nothing is left
    fn outstanding(&self, invoice: &Invoice) -> Result<Money, SettlementError> {
        let payments = self.repos.payments.find_by_invoice(invoice.id)?;
        let paid = Money::sum(payments.iter().map(|p| &p.amount), invoice.currency())?;
        let remaining = invoice.total.checked_sub(&paid)?;
        if !remaining.is_positive() {
            return Err(SettlementError::AlreadySettled(invoice.number.clone()));
        }
        Ok(remaining)
    }

    fn store_credit(
        &self,
        counterparty: Counterparty,
        amount: Money,
        command_id: CommandId,
    ) -> Result<(), SettlementError> {
        if self.repos.credits.find_by_source_command(command_id)?.is_some() {
            return Ok(());
        }
        let credit = StoredCredit::new(
            self.ids.next_id(),
            counterparty,
            amount,
            command_id,
            self.repos.credits.next_sequence()?,
            self.clock.now(),
        )?;
        self.repos.credits.save(&credit)?;
        info!(credit_id = %credit.id, amount = %amount, "Stored credit");
        Ok(())
    }

    /// Saves the payment for `applied` and moves the invoice to `Paid` or
    /// `PartiallyPaid`
    fn record_settlement(
        &self,
        invoice: Invoice,
        applied: Money,
        remaining: Money,
        date: NaiveDate,
        bank_account_code: &str,
        command_id: CommandId,
    ) -> Result<(), SettlementError> {
        let payment = Payment::new(
            self.ids.next_id(),
            invoice.id,
            applied,
            date,
            bank_account_code,
            command_id,
            self.clock.now(),
        );
        self.repos.payments.save(&payment)?;

        let updated = if applied == remaining {
            invoice.mark_paid()?
        } else {
            invoice.mark_partially_paid()?
        };
        self.repos.invoices.save(&updated)?;
        Ok(())
    }
}

/// Looks up a configured account, naming its role when it is missing
pub(crate) fn configured_account(
    ledger: &LedgerEngine,
    ledger_id: LedgerId,
    role: &'static str,
    code: &str,
) -> Result<Account, SettlementError> {
    match ledger.account_by_code(ledger_id, code) {
        Ok(account) => Ok(account),
        Err(LedgerError::AccountNotFound(_)) => Err(SettlementError::AccountNotConfigured {
            role,
            code: code.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

fn ensure_positive(amount: &Money, message: &str) -> Result<(), SettlementError> {
    if !amount.is_positive() {
        return Err(SettlementError::validation(message));
    }
    Ok(())
}

fn ensure_currency(amount: &Money, expected: Currency, message: &str) -> Result<(), SettlementError> {
    if amount.currency() != expected {
        return Err(SettlementError::validation(format!(
            "{}: {} vs {}",
            message,
            amount.currency(),
            expected
        )));
    }
    Ok(())
}
