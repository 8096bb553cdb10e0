//! Ledger repositories
//!
//! Accounts, periods, entries and journal transactions. Entries and
//! transactions are append-only and keep insertion order.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use tracing::debug;

use core_kernel::{AccountId, DomainPort, EntryId, LedgerId, PeriodId, PortError, TransactionId};
use domain_ledger::{
    Account, AccountRepository, AccountingPeriod, JournalTransaction, JournalTransactionRepository,
    JournalType, LedgerEntry, LedgerEntryRepository, PeriodRepository, PeriodStatus,
};

use super::{read, write};

/// Chart of accounts keyed by id
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryAccountRepository {}

impl AccountRepository for InMemoryAccountRepository {
    fn save(&self, account: &Account) -> Result<(), PortError> {
        write(&self.accounts, "account")?.insert(account.id, account.clone());
        Ok(())
    }

    fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, PortError> {
        Ok(read(&self.accounts, "account")?.get(&id).cloned())
    }

    fn find_by_code(&self, ledger_id: LedgerId, code: &str) -> Result<Option<Account>, PortError> {
        Ok(read(&self.accounts, "account")?
            .values()
            .find(|a| a.ledger_id == ledger_id && a.code == code)
            .cloned())
    }

    fn find_by_ledger(&self, ledger_id: LedgerId) -> Result<Vec<Account>, PortError> {
        Ok(read(&self.accounts, "account")?
            .values()
            .filter(|a| a.ledger_id == ledger_id)
            .cloned()
            .collect())
    }
}

/// Accounting periods keyed by id
#[derive(Debug, Default)]
pub struct InMemoryPeriodRepository {
    periods: RwLock<HashMap<PeriodId, AccountingPeriod>>,
}

impl InMemoryPeriodRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for InMemoryPeriodRepository {}

impl PeriodRepository for InMemoryPeriodRepository {
    fn save(&self, period: &AccountingPeriod) -> Result<(), PortError> {
        write(&self.periods, "period")?.insert(period.id, period.clone());
        Ok(())
    }

    fn find_by_id(&self, id: PeriodId) -> Result<Option<AccountingPeriod>, PortError> {
        Ok(read(&self.periods, "period")?.get(&id).cloned())
    }

    fn find_by_date(
        &self,
        ledger_id: LedgerId,
        date: NaiveDate,
    ) -> Result<Option<AccountingPeriod>, PortError> {
        Ok(read(&self.periods, "period")?
            .values()
            .filter(|p| p.ledger_id == ledger_id && p.contains(date))
            .min_by_key(|p| p.start_date())
            .cloned())
    }

    fn find_by_ledger(&self, ledger_id: LedgerId) -> Result<Vec<AccountingPeriod>, PortError> {
        Ok(read(&self.periods, "period")?
            .values()
            .filter(|p| p.ledger_id == ledger_id)
            .cloned()
            .collect())
    }

    fn find_by_status(
        &self,
        ledger_id: LedgerId,
        status: PeriodStatus,
    ) -> Result<Vec<AccountingPeriod>, PortError> {
        Ok(read(&self.periods, "period")?
            .values()
            .filter(|p| p.ledger_id == ledger_id && p.status == status)
            .cloned()
            .collect())
    }
}

/// Append-only ledger entries
#[derive(Debug, Default)]
pub struct InMemoryLedgerEntryRepository {
    entries: RwLock<Vec<LedgerEntry>>,
}

impl InMemoryLedgerEntryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> Result<usize, PortError> {
        Ok(read(&self.entries, "entry")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, PortError> {
        Ok(self.len()? == 0)
    }
}

impl DomainPort for InMemoryLedgerEntryRepository {}

impl LedgerEntryRepository for InMemoryLedgerEntryRepository {
    fn save_all(&self, entries: &[LedgerEntry]) -> Result<(), PortError> {
        let mut stored = write(&self.entries, "entry")?;

        let mut incoming: HashSet<EntryId> = HashSet::with_capacity(entries.len());
        for entry in entries {
            if !incoming.insert(entry.id) {
                return Err(PortError::conflict(format!("Duplicate entry id {} in batch", entry.id)));
            }
        }
        if let Some(clash) = stored.iter().find(|e| incoming.contains(&e.id)) {
            return Err(PortError::conflict(format!("Entry {} already exists", clash.id)));
        }

        stored.extend(entries.iter().cloned());
        debug!(count = entries.len(), total = stored.len(), "Appended ledger entries");
        Ok(())
    }

    fn find_by_account(&self, account_id: AccountId) -> Result<Vec<LedgerEntry>, PortError> {
        Ok(read(&self.entries, "entry")?
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect())
    }

    fn find_by_account_between(
        &self,
        account_id: AccountId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>, PortError> {
        Ok(read(&self.entries, "entry")?
            .iter()
            .filter(|e| e.account_id == account_id && e.effective_at >= from && e.effective_at <= to)
            .cloned()
            .collect())
    }
}

/// Append-only journal transactions
#[derive(Debug, Default)]
pub struct InMemoryJournalTransactionRepository {
    transactions: RwLock<Vec<JournalTransaction>>,
}

impl InMemoryJournalTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored transactions
    pub fn len(&self) -> Result<usize, PortError> {
        Ok(read(&self.transactions, "transaction")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, PortError> {
        Ok(self.len()? == 0)
    }
}

impl DomainPort for InMemoryJournalTransactionRepository {}

impl JournalTransactionRepository for InMemoryJournalTransactionRepository {
    fn save(&self, transaction: &JournalTransaction) -> Result<(), PortError> {
        let mut stored = write(&self.transactions, "transaction")?;
        if stored.iter().any(|t| t.id == transaction.id) {
            return Err(PortError::conflict(format!(
                "Journal transaction {} already exists",
                transaction.id
            )));
        }
        stored.push(transaction.clone());
        Ok(())
    }

    fn find_by_id(&self, id: TransactionId) -> Result<Option<JournalTransaction>, PortError> {
        Ok(read(&self.transactions, "transaction")?
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    fn find_by_journal_and_reference(
        &self,
        journal: JournalType,
        reference: &str,
    ) -> Result<Option<JournalTransaction>, PortError> {
        Ok(read(&self.transactions, "transaction")?
            .iter()
            .find(|t| t.journal == journal && t.reference == reference)
            .cloned())
    }

    fn find_by_journal(&self, journal: JournalType) -> Result<Vec<JournalTransaction>, PortError> {
        Ok(read(&self.transactions, "transaction")?
            .iter()
            .filter(|t| t.journal == journal)
            .cloned()
            .collect())
    }

    fn find_by_period(&self, period_id: PeriodId) -> Result<Vec<JournalTransaction>, PortError> {
        Ok(read(&self.transactions, "transaction")?
            .iter()
            .filter(|t| t.period_id == period_id)
            .cloned()
            .collect())
    }
}
