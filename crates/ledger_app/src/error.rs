//! Application error handling

use thiserror::Error;

use core_kernel::ErrorKind;
use domain_ledger::LedgerError;
use domain_settlement::SettlementError;

/// Errors raised while configuring or wiring the application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Tracing initialisation failed: {0}")]
    Telemetry(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),
}

impl AppError {
    /// Classifies this error; configuration problems are caller errors
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Config(_) => ErrorKind::Validation,
            AppError::Telemetry(_) => ErrorKind::Infrastructure,
            AppError::Ledger(e) => e.kind(),
            AppError::Settlement(e) => e.kind(),
        }
    }
}
