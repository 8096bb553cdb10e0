//! Stored credits
//!
//! Customer credits (a liability) and supplier advances (an asset) created
//! by overpayments and unallocated payments. Pools are consumed oldest
//! first, by `sequence`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CommandId, CreditId, Money};
use crate::error::SettlementError;
use crate::invoice::Counterparty;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredit {
    pub id: CreditId,
    pub counterparty: Counterparty,
    /// Amount at creation
    pub original: Money,
    /// Amount still available
    pub remaining: Money,
    /// Command that created the credit
    pub source_command_id: CommandId,
    /// Creation order within the repository
    pub sequence: u64,
    pub created_at: DateTime<Utc>,
}

impl StoredCredit {
    pub fn new(
        id: CreditId,
        counterparty: Counterparty,
        amount: Money,
        source_command_id: CommandId,
        sequence: u64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, SettlementError> {
        if !amount.is_positive() {
            return Err(SettlementError::validation("Credit amount must be positive"));
        }
        Ok(Self {
            id,
            counterparty,
            original: amount,
            remaining: amount,
            source_command_id,
            sequence,
            created_at,
        })
    }

    pub fn is_open(&self) -> bool {
        self.remaining.is_positive()
    }

    /// Returns the credit with `amount` consumed
    pub fn consume(self, amount: Money) -> Result<Self, SettlementError> {
        if !amount.is_positive() {
            return Err(SettlementError::validation("Consumed amount must be positive"));
        }
        let remaining = self.remaining.checked_sub(&amount)?;
        if remaining.is_negative() {
            return Err(SettlementError::InsufficientCredit {
                requested: amount,
                available: self.remaining,
            });
        }
        Ok(Self { remaining, ..self })
    }
}

/// Plans oldest-first consumption of `amount` from `pool`
///
/// `pool` must already be ordered by sequence. Returns the consumed credits
/// to persist, or `InsufficientCredit` before anything is consumed.
pub fn plan_consumption(
    pool: Vec<StoredCredit>,
    amount: Money,
) -> Result<Vec<StoredCredit>, SettlementError> {
    let available = Money::sum(pool.iter().map(|c| &c.remaining), amount.currency())?;
    if available.checked_cmp(&amount)?.is_lt() {
        return Err(SettlementError::InsufficientCredit {
            requested: amount,
            available,
        });
    }

    let mut left = amount;
    let mut consumed = Vec::new();
    for credit in pool {
        if !left.is_positive() {
            break;
        }
        let take = credit.remaining.min(&left)?;
        left = left.checked_sub(&take)?;
        consumed.push(credit.consume(take)?);
    }
    Ok(consumed)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use core_kernel::{Currency, CustomerId};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn consumption_takes_exactly_the_requested_amount(
            remainders in prop::collection::vec(1i64..10_000, 1..8),
            share in 1u32..=100,
        ) {
            let counterparty = Counterparty::Customer(CustomerId::new());
            let pool: Vec<StoredCredit> = remainders
                .iter()
                .enumerate()
                .map(|(i, minor)| {
                    StoredCredit::new(
                        CreditId::new(),
                        counterparty,
                        Money::from_minor(*minor, Currency::EUR),
                        CommandId::new(),
                        i as u64 + 1,
                        Utc::now(),
                    )
                    .unwrap()
                })
                .collect();
            let total: i64 = remainders.iter().sum();
            let requested = Money::from_minor((total * i64::from(share) / 100).max(1), Currency::EUR);

            let before: std::collections::HashMap<_, _> =
                pool.iter().map(|c| (c.id, c.remaining)).collect();
            let consumed = plan_consumption(pool, requested).unwrap();

            let taken = consumed.iter().fold(Money::zero(Currency::EUR), |acc, c| {
                acc.checked_add(&before[&c.id].checked_sub(&c.remaining).unwrap()).unwrap()
            });
            prop_assert_eq!(taken, requested);
            // only the last touched credit may stay open
            prop_assert!(consumed.iter().rev().skip(1).all(|c| !c.is_open()));
        }
    }
}
