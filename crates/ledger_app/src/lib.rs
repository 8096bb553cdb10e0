//! Ledger Application Layer
//!
//! Loads configuration, initialises tracing and wires the ledger, closing,
//! statement, settlement and invoice-posting engines over the in-memory
//! store.
//!
//! # Example
//!
//! ```rust,ignore
//! use ledger_app::{AppConfig, LedgerApp};
//!
//! let app = LedgerApp::new(AppConfig::from_env()?);
//! let ledger_id = app.new_ledger_id();
//! app.open_standard_chart(ledger_id)?;
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod telemetry;

pub use app::{standard_chart, ChartAccount, LedgerApp, CAPITAL_CODE, RETAINED_EARNINGS_CODE};
pub use config::{AppConfig, LogFormat};
pub use error::AppError;
pub use telemetry::init_tracing;
