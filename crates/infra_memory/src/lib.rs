//! In-Memory Infrastructure Layer
//!
//! This crate provides thread-safe, process-local implementations of every
//! repository port of the ledger and settlement domains.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each adapter implements one
//! domain port over a `RwLock`-guarded collection. A poisoned lock is
//! reported as `PortError::Internal` instead of panicking.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_memory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! let engine = LedgerEngine::new(store.ledger_repositories(), clock, ids, tz);
//! ```

pub mod repositories;
pub mod store;

pub use repositories::{
    InMemoryAccountRepository, InMemoryCreditRepository, InMemoryIdempotencyRepository,
    InMemoryInvoiceRepository, InMemoryJournalTransactionRepository,
    InMemoryLedgerEntryRepository, InMemoryPaymentRepository, InMemoryPeriodRepository,
};
pub use store::InMemoryStore;
