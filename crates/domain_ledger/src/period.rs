//! Accounting periods
//!
//! A period covers an inclusive range of business dates and moves through
//! `Open -> Closed -> Archived`, never backwards. Transitions consume the
//! period and return the new value.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{DateRange, LedgerId, PeriodId};
use crate::error::LedgerError;

/// Lifecycle status of a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodStatus {
    /// Accepts postings
    Open,
    /// Closing entries posted; no further postings
    Closed,
    /// Retained for history only
    Archived,
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodStatus::Open => "OPEN",
            PeriodStatus::Closed => "CLOSED",
            PeriodStatus::Archived => "ARCHIVED",
        };
        f.write_str(label)
    }
}

/// An accounting period of one ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    pub id: PeriodId,
    pub ledger_id: LedgerId,
    pub name: String,
    pub range: DateRange,
    pub status: PeriodStatus,
}

impl AccountingPeriod {
    /// Creates an open period
    pub fn open(
        id: PeriodId,
        ledger_id: LedgerId,
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, LedgerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LedgerError::validation("Period name is required"));
        }
        let range = DateRange::new(start, end)?;

        Ok(Self {
            id,
            ledger_id,
            name,
            range,
            status: PeriodStatus::Open,
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.range.start
    }

    pub fn end_date(&self) -> NaiveDate {
        self.range.end
    }

    pub fn is_open(&self) -> bool {
        self.status == PeriodStatus::Open
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range.contains(date)
    }

    /// `Open -> Closed`
    pub fn close(self) -> Result<Self, LedgerError> {
        match self.status {
            PeriodStatus::Open => Ok(Self {
                status: PeriodStatus::Closed,
                ..self
            }),
            other => Err(LedgerError::invalid_state(format!(
                "Only open periods can be closed; period {} is {}",
                self.name, other
            ))),
        }
    }

    /// `Closed -> Archived`
    pub fn archive(self) -> Result<Self, LedgerError> {
        match self.status {
            PeriodStatus::Closed => Ok(Self {
                status: PeriodStatus::Archived,
                ..self
            }),
            other => Err(LedgerError::invalid_state(format!(
                "Only closed periods can be archived; period {} is {}",
                self.name, other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn january() -> AccountingPeriod {
        AccountingPeriod::open(
            PeriodId::new(),
            LedgerId::new(),
            "2024-01",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_lifecycle_is_one_directional() {
        let period = january();
        assert!(period.is_open());

        let closed = period.close().unwrap();
        assert_eq!(closed.status, PeriodStatus::Closed);
        assert!(closed.clone().close().is_err());

        let archived = closed.archive().unwrap();
        assert_eq!(archived.status, PeriodStatus::Archived);
        assert!(archived.clone().close().is_err());
        assert!(archived.archive().is_err());
    }

    #[test]
    fn test_open_period_cannot_be_archived() {
        let err = january().archive().unwrap_err();
        assert!(matches!(err, LedgerError::InvalidStateTransition(_)));
    }

    #[test]
    fn test_inverted_dates_rejected() {
        let result = AccountingPeriod::open(
            PeriodId::new(),
            LedgerId::new(),
            "bad",
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        );
        assert!(matches!(result, Err(LedgerError::Temporal(_))));
    }
}
