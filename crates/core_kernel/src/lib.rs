//! Core Kernel - Foundational types and utilities for the ledger engine
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Business dates, time zones and an injectable clock
//! - Strongly-typed identifiers and an injectable id generator
//! - Port error types shared by every repository adapter

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{Clock, DateRange, FixedClock, SystemClock, TemporalError, Timezone};
pub use identifiers::{
    LedgerId, AccountId, PeriodId, EntryId, TransactionId, CommandId,
    CustomerId, SupplierId, InvoiceId, PaymentId, CreditId,
    IdGenerator, RandomIds, SequentialIds,
};
pub use ports::{DomainPort, PortError};
pub use error::ErrorKind;
