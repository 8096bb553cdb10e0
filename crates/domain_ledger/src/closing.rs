//! Period closing
//!
//! Closing zeroes every income and expense account for the period into a
//! retained earnings account with a single `CLOSE-<period>` adjustment, then
//! marks the period closed.

use std::sync::Arc;
use tracing::{info, instrument};

use core_kernel::{AccountId, PeriodId};
use crate::account::AccountType;
use crate::error::LedgerError;
use crate::ledger::LedgerEngine;
use crate::period::AccountingPeriod;
use crate::transaction::{
    JournalTransaction, JournalType, Posting, TransactionRequest, CLOSING_REFERENCE_PREFIX,
};

/// Outcome of closing a period
#[derive(Debug, Clone)]
pub struct ClosingResult {
    pub period: AccountingPeriod,
    /// `None` when no result account carried a balance
    pub closing_transaction: Option<JournalTransaction>,
}

pub struct PeriodClosing {
    engine: Arc<LedgerEngine>,
}

impl PeriodClosing {
    pub fn new(engine: Arc<LedgerEngine>) -> Self {
        Self { engine }
    }

    /// Closes an open period
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the period is not open
    /// - Validation error if the retained earnings account is not an equity
    ///   account of the period's ledger
    #[instrument(skip(self), fields(period = %period_id, retained_earnings = %retained_earnings_id))]
    pub fn close_period(
        &self,
        period_id: PeriodId,
        retained_earnings_id: AccountId,
    ) -> Result<ClosingResult, LedgerError> {
        let period = self.engine.period(period_id)?;
        if !period.is_open() {
            return Err(LedgerError::invalid_state(format!(
                "Only open periods can be closed; period {} is {}",
                period.name, period.status
            )));
        }

        let retained = self.engine.account(retained_earnings_id)?;
        if retained.account_type != AccountType::Equity {
            return Err(LedgerError::validation(format!(
                "Retained earnings account {} must be an equity account",
                retained.code
            )));
        }
        if retained.ledger_id != period.ledger_id {
            return Err(LedgerError::validation(format!(
                "Retained earnings account {} does not belong to the period's ledger",
                retained.code
            )));
        }

        let mut postings = Vec::new();
        for account in self.engine.list_accounts(period.ledger_id)? {
            if !account.account_type.is_result_account() {
                continue;
            }
            let balance = self.engine.get_balance_for_period(account.id, &period)?;
            if balance.is_zero() {
                continue;
            }

            let amount = balance.abs();
            // A positive income balance is a credit balance; a positive
            // expense balance is a debit balance. Closing posts the opposite.
            let to_close = account.account_type.normal_side().opposite();
            let (closing_leg, retained_leg) = if balance.is_positive() {
                (to_close, to_close.opposite())
            } else {
                (to_close.opposite(), to_close)
            };
            postings.push(Posting::new(account.id, amount, closing_leg));
            postings.push(Posting::new(retained.id, amount, retained_leg));
        }

        let closing_transaction = if postings.is_empty() {
            None
        } else {
            let request = TransactionRequest::new(
                JournalType::Adjustment,
                format!("{}{}", CLOSING_REFERENCE_PREFIX, period.name),
                period.end_date(),
            )
            .described(format!("Closing entries for period {}", period.name))
            .postings(postings);
            Some(self.engine.post_journal_transaction(request)?)
        };

        let closed = period.close()?;
        self.engine.save_period(&closed)?;

        info!(
            name = %closed.name,
            closing_transaction = ?closing_transaction.as_ref().map(|t| t.id),
            "Closed accounting period"
        );
        Ok(ClosingResult {
            period: closed,
            closing_transaction,
        })
    }
}
