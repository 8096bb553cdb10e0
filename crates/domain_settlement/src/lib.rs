//! Settlement Domain - Invoices, Payments and Stored Credit
//!
//! This crate settles sales and purchase invoices against the ledger:
//!
//! - **Posting**: issued invoices and sales credit notes become Sales or
//!   Purchases journal transactions, VAT split per line
//! - **Payments**: bank payments, overpayments and batch payments
//! - **Stored credit**: customer credits and supplier advances, consumed
//!   oldest first
//! - **Idempotency**: every settlement command runs at most once per
//!   command identifier
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_settlement::{InvoicePosting, SettlementEngine};
//!
//! posting.post_invoice(invoice.id)?;
//! let txn = settlement.record_payment(command_id, invoice.id, "5121", None, date)?;
//! ```

pub mod config;
pub mod credit;
pub mod engine;
pub mod error;
pub mod idempotency;
pub mod invoice;
pub mod payment;
pub mod ports;
pub mod posting;

pub use config::{SettlementAccounts, SettlementConfig};
pub use credit::StoredCredit;
pub use engine::{PaymentAllocation, SettlementEngine, SettlementRepositories};
pub use error::SettlementError;
pub use idempotency::{IdempotencyExecutor, IdempotencyRecord};
pub use invoice::{Counterparty, Invoice, InvoiceLine, InvoiceStatus, Side, TaxCategory, VatSplit};
pub use payment::Payment;
pub use ports::{CreditRepository, IdempotencyRepository, InvoiceRepository, PaymentRepository};
pub use posting::InvoicePosting;
