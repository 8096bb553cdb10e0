//! Application configuration

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};
use serde::Deserialize;

use core_kernel::{Currency, Timezone};
use domain_settlement::SettlementConfig;

use crate::error::AppError;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, one line per event
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Application configuration
///
/// Every field has a default; the environment only overrides.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Log filter directive (trace, debug, info, warn, error or a full EnvFilter)
    pub log_level: String,
    pub log_format: LogFormat,
    /// IANA time zone in which business dates are interpreted
    pub timezone: Timezone,
    /// Ledger and reporting currency
    pub currency: Currency,
    /// Human-readable ledger name
    pub ledger_name: String,
    /// Account codes, VAT rate and credit sentinels
    pub settlement: SettlementConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            timezone: Timezone::default(),
            currency: Currency::EUR,
            ledger_name: "main".to_string(),
            settlement: SettlementConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `LEDGER_*` environment variables
    ///
    /// Nested keys use `__`, e.g. `LEDGER_SETTLEMENT__VAT_RATE=0.055` or
    /// `LEDGER_SETTLEMENT__ACCOUNTS__BANK=512100`.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_builder(
            Config::builder().add_source(
                Environment::with_prefix("LEDGER")
                    .prefix_separator("_")
                    .separator("__"),
            ),
        )
    }

    /// Builds configuration from any set of `config` sources
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_builder(Config::builder()).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.currency, Currency::EUR);
        assert_eq!(config.settlement.accounts.bank, "5121");
        assert_eq!(config.settlement.vat_rate.as_decimal(), dec!(0.20));
    }

    #[test]
    fn test_overrides_nested_keys() {
        let builder = Config::builder()
            .set_override("log_format", "json")
            .unwrap()
            .set_override("timezone", "America/New_York")
            .unwrap()
            .set_override("settlement.accounts.bank", "512100")
            .unwrap()
            .set_override("settlement.vat_rate", "0.055")
            .unwrap();

        let config = AppConfig::from_builder(builder).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.timezone.name(), "America/New_York");
        assert_eq!(config.settlement.accounts.bank, "512100");
        assert_eq!(config.settlement.accounts.receivable, "4110");
        assert_eq!(config.settlement.vat_rate.as_decimal(), dec!(0.055));
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        let builder = Config::builder().set_override("timezone", "Mars/Olympus").unwrap();
        assert!(AppConfig::from_builder(builder).is_err());
    }
}
