//! One process-local store bundling every repository

use std::sync::Arc;

use domain_ledger::LedgerRepositories;
use domain_settlement::{IdempotencyRepository, InvoiceRepository, SettlementRepositories};

use crate::repositories::{
    InMemoryAccountRepository, InMemoryCreditRepository, InMemoryIdempotencyRepository,
    InMemoryInvoiceRepository, InMemoryJournalTransactionRepository,
    InMemoryLedgerEntryRepository, InMemoryPaymentRepository, InMemoryPeriodRepository,
};

/// Shared handles to every in-memory repository
///
/// Clones share the same underlying collections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub accounts: Arc<InMemoryAccountRepository>,
    pub periods: Arc<InMemoryPeriodRepository>,
    pub entries: Arc<InMemoryLedgerEntryRepository>,
    pub transactions: Arc<InMemoryJournalTransactionRepository>,
    pub invoices: Arc<InMemoryInvoiceRepository>,
    pub payments: Arc<InMemoryPaymentRepository>,
    pub credits: Arc<InMemoryCreditRepository>,
    pub idempotency: Arc<InMemoryIdempotencyRepository>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ledger_repositories(&self) -> LedgerRepositories {
        LedgerRepositories {
            accounts: self.accounts.clone(),
            periods: self.periods.clone(),
            entries: self.entries.clone(),
            transactions: self.transactions.clone(),
        }
    }

    pub fn settlement_repositories(&self) -> SettlementRepositories {
        SettlementRepositories {
            invoices: self.invoices.clone(),
            payments: self.payments.clone(),
            credits: self.credits.clone(),
        }
    }

    pub fn invoice_repository(&self) -> Arc<dyn InvoiceRepository> {
        self.invoices.clone()
    }

    pub fn idempotency_repository(&self) -> Arc<dyn IdempotencyRepository> {
        self.idempotency.clone()
    }
}
