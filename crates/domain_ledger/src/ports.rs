//! Repository ports of the ledger domain
//!
//! Narrow save/find contracts consumed by the posting engine. Lookups return
//! `Ok(None)` for a missing entity; `PortError` is reserved for failures of
//! the storage itself or uniqueness conflicts.

use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::{AccountId, DomainPort, LedgerId, PeriodId, PortError, TransactionId};
use crate::account::Account;
use crate::entry::LedgerEntry;
use crate::period::{AccountingPeriod, PeriodStatus};
use crate::transaction::{JournalTransaction, JournalType};

/// Chart of accounts storage
pub trait AccountRepository: DomainPort {
    /// Inserts or replaces an account
    fn save(&self, account: &Account) -> Result<(), PortError>;

    fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, PortError>;

    fn find_by_code(&self, ledger_id: LedgerId, code: &str) -> Result<Option<Account>, PortError>;

    /// Every account of the ledger, in any order
    fn find_by_ledger(&self, ledger_id: LedgerId) -> Result<Vec<Account>, PortError>;
}

/// Accounting period storage
pub trait PeriodRepository: DomainPort {
    /// Inserts or replaces a period
    fn save(&self, period: &AccountingPeriod) -> Result<(), PortError>;

    fn find_by_id(&self, id: PeriodId) -> Result<Option<AccountingPeriod>, PortError>;

    /// The period of the ledger whose range contains `date`
    fn find_by_date(
        &self,
        ledger_id: LedgerId,
        date: NaiveDate,
    ) -> Result<Option<AccountingPeriod>, PortError>;

    fn find_by_ledger(&self, ledger_id: LedgerId) -> Result<Vec<AccountingPeriod>, PortError>;

    fn find_by_status(
        &self,
        ledger_id: LedgerId,
        status: PeriodStatus,
    ) -> Result<Vec<AccountingPeriod>, PortError>;
}

/// Append-only ledger entry storage
pub trait LedgerEntryRepository: DomainPort {
    /// Appends all entries or none of them
    fn save_all(&self, entries: &[LedgerEntry]) -> Result<(), PortError>;

    fn find_by_account(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>, PortError>;

    /// Entries of the account whose `effective_at` lies in `[from, to]`
    fn find_by_account_between(
        &self,
        account_id: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, PortError>;
}

/// Journal transaction storage
pub trait JournalTransactionRepository: DomainPort {
    /// Stores a new transaction
    ///
    /// Fails with a conflict if a transaction with the same id exists.
    fn save(&self, transaction: &JournalTransaction) -> Result<(), PortError>;

    fn find_by_id(&self, id: TransactionId) -> Result<Option<JournalTransaction>, PortError>;

    fn find_by_journal_and_reference(
        &self,
        journal: JournalType,
        reference: &str,
    ) -> Result<Option<JournalTransaction>, PortError>;

    fn find_by_journal(&self, journal: JournalType) -> Result<Vec<JournalTransaction>, PortError>;

    fn find_by_period(&self, period_id: PeriodId) -> Result<Vec<JournalTransaction>, PortError>;
}
