//! Double-entry posting engine
//!
//! This module provides the core ledger functionality, ensuring that
//! every posted transaction is balanced, currency-consistent and lands in an
//! open accounting period.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use core_kernel::{
    AccountId, Clock, Currency, IdGenerator, LedgerId, Money, PeriodId, Timezone, TransactionId,
};
use crate::account::{Account, AccountType};
use crate::entry::LedgerEntry;
use crate::error::LedgerError;
use crate::period::{AccountingPeriod, PeriodStatus};
use crate::ports::{
    AccountRepository, JournalTransactionRepository, LedgerEntryRepository, PeriodRepository,
};
use crate::transaction::{JournalTransaction, JournalType, Posting, TransactionRequest};

/// Storage collaborators of the engine
#[derive(Clone)]
pub struct LedgerRepositories {
    pub accounts: Arc<dyn AccountRepository>,
    pub periods: Arc<dyn PeriodRepository>,
    pub entries: Arc<dyn LedgerEntryRepository>,
    pub transactions: Arc<dyn JournalTransactionRepository>,
}

/// The ledger posting engine
///
/// # Invariants
///
/// - Every persisted transaction balances to zero in a single currency
/// - Validation completes before anything is written: a rejected posting
///   leaves no entry and no transaction behind
/// - Entries are never modified; corrections are new reversing transactions
pub struct LedgerEngine {
    repos: LedgerRepositories,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    timezone: Timezone,
}

impl LedgerEngine {
    /// Creates an engine over the given repositories
    ///
    /// # Arguments
    ///
    /// * `repos` - Account, period, entry and transaction storage
    /// * `clock` - Source of creation timestamps
    /// * `ids` - Source of new identities
    /// * `timezone` - Time zone in which business dates are interpreted
    pub fn new(
        repos: LedgerRepositories,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        timezone: Timezone,
    ) -> Self {
        Self {
            repos,
            clock,
            ids,
            timezone,
        }
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    // ------------------------------------------------------------------
    // Chart of accounts
    // ------------------------------------------------------------------

    /// Opens a new account in a ledger
    ///
    /// # Errors
    ///
    /// - Validation error on a blank code or name
    /// - `DuplicateAccountCode` if the code is already used in the ledger
    #[instrument(skip(self, name), fields(ledger = %ledger_id, code = %code))]
    pub fn open_account(
        &self,
        ledger_id: LedgerId,
        code: &str,
        name: &str,
        account_type: AccountType,
        currency: Currency,
    ) -> Result<Account, LedgerError> {
        let account = Account::open(
            self.ids.next_id(),
            ledger_id,
            code,
            name,
            account_type,
            currency,
        )?;

        if self
            .repos
            .accounts
            .find_by_code(ledger_id, &account.code)?
            .is_some()
        {
            return Err(LedgerError::DuplicateAccountCode {
                ledger: ledger_id.to_string(),
                code: account.code,
            });
        }

        self.repos.accounts.save(&account)?;
        info!(account_id = %account.id, account_type = %account_type, "Opened account");
        Ok(account)
    }

    /// Soft-deactivates an account
    #[instrument(skip(self), fields(account = %account_id))]
    pub fn deactivate_account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        let account = self.account(account_id)?.deactivate();
        self.repos.accounts.save(&account)?;
        info!("Deactivated account");
        Ok(account)
    }

    pub fn account(&self, account_id: AccountId) -> Result<Account, LedgerError> {
        self.repos
            .accounts
            .find_by_id(account_id)?
            .ok_or_else(|| LedgerError::AccountNotFound(account_id.to_string()))
    }

    pub fn account_by_code(&self, ledger_id: LedgerId, code: &str) -> Result<Account, LedgerError> {
        self.repos
            .accounts
            .find_by_code(ledger_id, code)?
            .ok_or_else(|| LedgerError::AccountNotFound(format!("{} in ledger {}", code, ledger_id)))
    }

    /// Accounts of the ledger ordered by code
    pub fn list_accounts(&self, ledger_id: LedgerId) -> Result<Vec<Account>, LedgerError> {
        let mut accounts = self.repos.accounts.find_by_ledger(ledger_id)?;
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    // ------------------------------------------------------------------
    // Accounting periods
    // ------------------------------------------------------------------

    /// Creates an open period
    ///
    /// # Errors
    ///
    /// `PeriodOverlap` if any existing period of the ledger shares a day with
    /// the new one; this keeps date lookups unambiguous.
    #[instrument(skip(self), fields(ledger = %ledger_id))]
    pub fn create_period(
        &self,
        ledger_id: LedgerId,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AccountingPeriod, LedgerError> {
        let period = AccountingPeriod::open(self.ids.next_id(), ledger_id, name, start, end)?;

        let existing = self.repos.periods.find_by_ledger(ledger_id)?;
        if let Some(clash) = existing.iter().find(|p| p.range.overlaps(&period.range)) {
            return Err(LedgerError::PeriodOverlap {
                name: period.name,
                existing: clash.name.clone(),
            });
        }

        self.repos.periods.save(&period)?;
        info!(period_id = %period.id, range = %period.range, "Created accounting period");
        Ok(period)
    }

    pub fn period(&self, period_id: PeriodId) -> Result<AccountingPeriod, LedgerError> {
        self.repos
            .periods
            .find_by_id(period_id)?
            .ok_or_else(|| LedgerError::PeriodNotFound(period_id.to_string()))
    }

    /// The period of the ledger covering `date`, whatever its status
    pub fn period_for_date(
        &self,
        ledger_id: LedgerId,
        date: NaiveDate,
    ) -> Result<AccountingPeriod, LedgerError> {
        self.repos
            .periods
            .find_by_date(ledger_id, date)?
            .ok_or(LedgerError::NoPeriodCoversDate(date))
    }

    /// Periods of the ledger ordered by start date
    pub fn list_periods(&self, ledger_id: LedgerId) -> Result<Vec<AccountingPeriod>, LedgerError> {
        let mut periods = self.repos.periods.find_by_ledger(ledger_id)?;
        periods.sort_by_key(|p| p.start_date());
        Ok(periods)
    }

    pub fn list_periods_with_status(
        &self,
        ledger_id: LedgerId,
        status: PeriodStatus,
    ) -> Result<Vec<AccountingPeriod>, LedgerError> {
        let mut periods = self.repos.periods.find_by_status(ledger_id, status)?;
        periods.sort_by_key(|p| p.start_date());
        Ok(periods)
    }

    /// Moves a closed period to `Archived`
    #[instrument(skip(self), fields(period = %period_id))]
    pub fn archive_period(&self, period_id: PeriodId) -> Result<AccountingPeriod, LedgerError> {
        let archived = self.period(period_id)?.archive()?;
        self.repos.periods.save(&archived)?;
        info!(name = %archived.name, "Archived accounting period");
        Ok(archived)
    }

    pub(crate) fn save_period(&self, period: &AccountingPeriod) -> Result<(), LedgerError> {
        self.repos.periods.save(period)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Posting
    // ------------------------------------------------------------------

    /// Validates and persists a journal transaction
    ///
    /// Every check, including the zero-sum check, runs before the first
    /// write. On success all entries are persisted, then the transaction.
    ///
    /// # Errors
    ///
    /// - Validation: fewer than two postings, blank reference, non-positive
    ///   amount, inactive account, accounts from several ledgers, unbalanced
    ///   postings
    /// - `AccountNotFound` for an unknown account
    /// - `CurrencyMismatch` when accounts or amounts disagree on currency
    /// - `NoPeriodCoversDate` / `PeriodNotOpen` for a bad business date
    #[instrument(
        skip(self, request),
        fields(journal = %request.journal, reference = %request.reference, date = %request.transaction_date)
    )]
    pub fn post_journal_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<JournalTransaction, LedgerError> {
        let result = self.validate_and_build(&request);
        let transaction = match result {
            Ok(transaction) => transaction,
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "Rejected journal transaction");
                return Err(e);
            }
        };

        self.repos.entries.save_all(transaction.entries())?;
        self.repos.transactions.save(&transaction)?;

        info!(
            transaction_id = %transaction.id,
            period_id = %transaction.period_id,
            entries = transaction.entries().len(),
            "Posted journal transaction"
        );
        Ok(transaction)
    }

    fn validate_and_build(&self, request: &TransactionRequest) -> Result<JournalTransaction, LedgerError> {
        if request.postings.len() < 2 {
            return Err(LedgerError::validation("At least two postings are required"));
        }
        if request.reference.trim().is_empty() {
            return Err(LedgerError::validation("Reference is required"));
        }

        let accounts = self.resolve_accounts(&request.postings)?;
        // resolve_accounts returns one account per posting, so there is a first one
        let first = &accounts[0];
        let (ledger_id, currency) = (first.ledger_id, first.currency);

        for (posting, account) in request.postings.iter().zip(&accounts) {
            if account.ledger_id != ledger_id {
                return Err(LedgerError::validation(format!(
                    "Account {} belongs to ledger {}, expected {}",
                    account.code, account.ledger_id, ledger_id
                )));
            }
            if account.currency != currency {
                return Err(LedgerError::CurrencyMismatch(format!(
                    "All accounts in a transaction must share the same currency; {} is {}, expected {}",
                    account.code, account.currency, currency
                )));
            }
            if posting.amount.currency() != account.currency {
                return Err(LedgerError::CurrencyMismatch(format!(
                    "Posting amount currency {} must match account {} currency {}",
                    posting.amount.currency(),
                    account.code,
                    account.currency
                )));
            }
            if !posting.amount.is_positive() {
                return Err(LedgerError::validation(format!(
                    "Posting amount on account {} must be positive",
                    account.code
                )));
            }
            if !account.is_active && request.journal != JournalType::Adjustment {
                return Err(LedgerError::validation(format!(
                    "Account {} is inactive",
                    account.code
                )));
            }
        }
        debug!(%currency, "Postings resolved");

        let period = self.require_open_period(ledger_id, request.transaction_date)?;

        let transaction_id: TransactionId = self.ids.next_id();
        let created_at = self.clock.now();
        let effective_at = self.timezone.start_of_day(request.transaction_date)?;

        let entries = request
            .postings
            .iter()
            .map(|posting| {
                LedgerEntry::new(
                    self.ids.next_id(),
                    transaction_id,
                    posting.account_id,
                    posting.amount,
                    posting.direction,
                    request.description.clone(),
                    created_at,
                    effective_at,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        JournalTransaction::new(
            transaction_id,
            request.journal,
            request.reference.clone(),
            request.description.clone(),
            created_at,
            request.transaction_date,
            period.id,
            entries,
        )
    }

    fn resolve_accounts(&self, postings: &[Posting]) -> Result<Vec<Account>, LedgerError> {
        let mut cache: HashMap<AccountId, Account> = HashMap::new();
        let mut resolved = Vec::with_capacity(postings.len());
        for posting in postings {
            let account = match cache.get(&posting.account_id) {
                Some(account) => account.clone(),
                None => {
                    let account = self.account(posting.account_id)?;
                    cache.insert(account.id, account.clone());
                    account
                }
            };
            resolved.push(account);
        }
        Ok(resolved)
    }

    fn require_open_period(
        &self,
        ledger_id: LedgerId,
        date: NaiveDate,
    ) -> Result<AccountingPeriod, LedgerError> {
        let period = self.period_for_date(ledger_id, date)?;
        if !period.is_open() {
            return Err(LedgerError::PeriodNotOpen {
                name: period.name,
                status: period.status.to_string(),
            });
        }
        Ok(period)
    }

    /// Posts a two-leg transfer between accounts
    ///
    /// The reference is generated as
    /// `<JOURNAL>-TRF-<yyyymmdd>-<debitCode>-<creditCode>-<epochMillis>`.
    #[instrument(skip(self, description), fields(debit = %debit_account_id, credit = %credit_account_id, amount = %amount))]
    pub fn post_transfer(
        &self,
        debit_account_id: AccountId,
        credit_account_id: AccountId,
        amount: Money,
        journal: JournalType,
        description: &str,
        transaction_date: NaiveDate,
    ) -> Result<JournalTransaction, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::validation("Amount must be positive"));
        }
        let debit_account = self.account(debit_account_id)?;
        let credit_account = self.account(credit_account_id)?;
        if debit_account.currency != credit_account.currency {
            return Err(LedgerError::CurrencyMismatch(
                "Currency mismatch between accounts".to_string(),
            ));
        }
        if debit_account.currency != amount.currency() {
            return Err(LedgerError::CurrencyMismatch(
                "Currency mismatch between account and amount".to_string(),
            ));
        }

        let reference = format!(
            "{}-TRF-{}-{}-{}-{}",
            journal.name(),
            transaction_date.format("%Y%m%d"),
            debit_account.code,
            credit_account.code,
            self.clock.now().timestamp_millis()
        );

        self.post_journal_transaction(
            TransactionRequest::new(journal, reference, transaction_date)
                .described(description)
                .debit(debit_account_id, amount)
                .credit(credit_account_id, amount),
        )
    }

    /// Posts the inverse of an existing transaction to the adjustment journal
    ///
    /// Idempotent by `new_reference`: if the inverse of `original_id` was
    /// already posted under that reference it is returned and nothing is
    /// posted. Any other adjustment holding the reference is a conflict.
    #[instrument(skip(self, description), fields(original = %original_id, reference = %new_reference))]
    pub fn reverse_transaction(
        &self,
        original_id: TransactionId,
        new_reference: &str,
        description: &str,
        transaction_date: NaiveDate,
    ) -> Result<JournalTransaction, LedgerError> {
        let original = self.transaction(original_id)?;
        if let Some(existing) = self
            .repos
            .transactions
            .find_by_journal_and_reference(JournalType::Adjustment, new_reference)?
        {
            if !reverses(&existing, &original) {
                warn!(
                    transaction_id = %existing.id,
                    "Adjustment reference already used by an unrelated transaction"
                );
                return Err(LedgerError::invalid_state(format!(
                    "Adjustment {} does not reverse transaction {}",
                    new_reference, original.reference
                )));
            }
            debug!(transaction_id = %existing.id, "Reversal already posted");
            return Ok(existing);
        }

        let postings = original.entries().iter().map(|entry| {
            Posting::new(entry.account_id, entry.amount, entry.direction.opposite())
        });

        self.post_journal_transaction(
            TransactionRequest::new(JournalType::Adjustment, new_reference, transaction_date)
                .described(description)
                .postings(postings),
        )
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn transaction(&self, transaction_id: TransactionId) -> Result<JournalTransaction, LedgerError> {
        self.repos
            .transactions
            .find_by_id(transaction_id)?
            .ok_or_else(|| LedgerError::TransactionNotFound(transaction_id.to_string()))
    }

    /// Looks up a business posting by its reference
    pub fn find_transaction(
        &self,
        journal: JournalType,
        reference: &str,
    ) -> Result<Option<JournalTransaction>, LedgerError> {
        Ok(self
            .repos
            .transactions
            .find_by_journal_and_reference(journal, reference)?)
    }

    pub fn transactions_in_journal(
        &self,
        journal: JournalType,
    ) -> Result<Vec<JournalTransaction>, LedgerError> {
        let mut transactions = self.repos.transactions.find_by_journal(journal)?;
        sort_chronologically(&mut transactions);
        Ok(transactions)
    }

    pub fn transactions_for_period(
        &self,
        period_id: PeriodId,
    ) -> Result<Vec<JournalTransaction>, LedgerError> {
        let mut transactions = self.repos.transactions.find_by_period(period_id)?;
        sort_chronologically(&mut transactions);
        Ok(transactions)
    }

    /// Transactions of every period of the ledger, by business date then
    /// creation time
    pub fn list_transactions(&self, ledger_id: LedgerId) -> Result<Vec<JournalTransaction>, LedgerError> {
        let mut transactions = Vec::new();
        for period in self.repos.periods.find_by_ledger(ledger_id)? {
            transactions.extend(self.repos.transactions.find_by_period(period.id)?);
        }
        sort_chronologically(&mut transactions);
        Ok(transactions)
    }

    pub fn entries_for_account(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self.repos.entries.find_by_account(account_id)?)
    }

    /// All-time balance of an account, signed by its normal side
    pub fn get_balance(&self, account_id: AccountId) -> Result<Money, LedgerError> {
        let account = self.account(account_id)?;
        let entries = self.repos.entries.find_by_account(account_id)?;
        net_balance(&account, &entries)
    }

    /// Balance of an account over the period's window: local midnight of the
    /// start date through the last instant of the end date
    pub fn get_balance_for_period(
        &self,
        account_id: AccountId,
        period: &AccountingPeriod,
    ) -> Result<Money, LedgerError> {
        let account = self.account(account_id)?;
        let (from, to) = period.range.to_window(&self.timezone)?;
        let entries = self
            .repos
            .entries
            .find_by_account_between(account_id, from, to)?;
        net_balance(&account, &entries)
    }
}

/// True if `candidate` carries exactly the entries of `original` with
/// their directions flipped
fn reverses(candidate: &JournalTransaction, original: &JournalTransaction) -> bool {
    let mut unmatched: Vec<&LedgerEntry> = original.entries().iter().collect();
    if candidate.entries().len() != unmatched.len() {
        return false;
    }
    candidate.entries().iter().all(|entry| {
        let found = unmatched.iter().position(|o| {
            o.account_id == entry.account_id
                && o.amount == entry.amount
                && o.direction.opposite() == entry.direction
        });
        match found {
            Some(index) => {
                unmatched.swap_remove(index);
                true
            }
            None => false,
        }
    })
}

fn sort_chronologically(transactions: &mut [JournalTransaction]) {
    transactions.sort_by(|a, b| {
        a.transaction_date
            .cmp(&b.transaction_date)
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// Sums debits and credits separately and nets them by the account's side
fn net_balance(account: &Account, entries: &[LedgerEntry]) -> Result<Money, LedgerError> {
    entries.iter().try_fold(Money::zero(account.currency), |acc, entry| {
        Ok(acc.checked_add(&entry.balance_effect(account.account_type))?)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::EntryId;
    use rust_decimal_macros::dec;

    fn account(account_type: AccountType) -> Account {
        Account::open(
            AccountId::new(),
            LedgerId::new(),
            "1000",
            "Test",
            account_type,
            Currency::EUR,
        )
        .unwrap()
    }

    fn entry(account: &Account, amount: rust_decimal::Decimal, direction: crate::Direction) -> LedgerEntry {
        let now = Utc::now();
        LedgerEntry::new(
            EntryId::new(),
            TransactionId::new(),
            account.id,
            Money::new(amount, Currency::EUR),
            direction,
            "",
            now,
            now,
        )
        .unwrap()
    }

    #[test]
    fn test_net_balance_debit_normal() {
        let bank = account(AccountType::Asset);
        let entries = vec![
            entry(&bank, dec!(100), crate::Direction::Debit),
            entry(&bank, dec!(30), crate::Direction::Credit),
        ];
        assert_eq!(net_balance(&bank, &entries).unwrap().amount(), dec!(70));
    }

    #[test]
    fn test_net_balance_credit_normal() {
        let capital = account(AccountType::Equity);
        let entries = vec![
            entry(&capital, dec!(100), crate::Direction::Credit),
            entry(&capital, dec!(30), crate::Direction::Debit),
        ];
        assert_eq!(net_balance(&capital, &entries).unwrap().amount(), dec!(70));
    }

    #[test]
    fn test_net_balance_of_nothing_is_zero() {
        let revenue = account(AccountType::Income);
        let balance = net_balance(&revenue, &[]).unwrap();
        assert!(balance.is_zero());
        assert_eq!(balance.currency(), Currency::EUR);
    }
}
