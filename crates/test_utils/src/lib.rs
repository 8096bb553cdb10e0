//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! ledger and settlement test suites.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built amounts and dates
//! - `ledger`: A bootstrapped, deterministic ledger with the standard chart
//! - `builders`: Builder patterns for invoices
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators
//! - `logging`: One-time tracing setup for tests

pub mod fixtures;
pub mod ledger;
pub mod builders;
pub mod assertions;
pub mod generators;
pub mod logging;

pub use fixtures::*;
pub use ledger::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
pub use logging::*;
