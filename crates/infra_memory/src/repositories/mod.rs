//! Repository implementations for domain entities
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - One `RwLock` per collection; reads share, writes exclude
//! - Values are cloned in and out, never borrowed across calls
//! - Multi-item writes happen under a single write guard, so they are
//!   all-or-nothing

pub mod ledger;
pub mod settlement;

pub use ledger::{
    InMemoryAccountRepository, InMemoryJournalTransactionRepository,
    InMemoryLedgerEntryRepository, InMemoryPeriodRepository,
};
pub use settlement::{
    InMemoryCreditRepository, InMemoryIdempotencyRepository, InMemoryInvoiceRepository,
    InMemoryPaymentRepository,
};

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use core_kernel::PortError;

pub(crate) fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>, PortError> {
    lock.read()
        .map_err(|_| PortError::internal(format!("{} store lock poisoned", what)))
}

pub(crate) fn write<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockWriteGuard<'a, T>, PortError> {
    lock.write()
        .map_err(|_| PortError::internal(format!("{} store lock poisoned", what)))
}
