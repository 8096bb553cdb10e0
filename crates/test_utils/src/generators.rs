//! Property-Based Test Generators
//!
//! Proptest strategies for amounts and posting sets that respect the
//! ledger's invariants.

use core_kernel::{Currency, Money};
use domain_ledger::Direction;
use proptest::prelude::*;

/// Strategy for positive amounts in minor units (cents)
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000i64
}

/// Strategy for positive EUR amounts
pub fn eur_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|minor| Money::from_minor(minor, Currency::EUR))
}

/// Strategy for a balanced set of EUR legs
///
/// One to four debit legs; their total is split into one to four credit
/// legs, the last one absorbing the rounding remainder.
pub fn balanced_legs_strategy() -> impl Strategy<Value = Vec<(Direction, Money)>> {
    (
        prop::collection::vec(1i64..1_000_000i64, 1..=4),
        1i64..=4i64,
    )
        .prop_map(|(debits, credit_legs)| {
            let total: i64 = debits.iter().sum();
            let credit_legs = credit_legs.min(total);
            let share = total / credit_legs;

            let mut legs: Vec<(Direction, Money)> = debits
                .into_iter()
                .map(|minor| (Direction::Debit, Money::from_minor(minor, Currency::EUR)))
                .collect();
            for i in 0..credit_legs {
                let minor = if i == credit_legs - 1 {
                    total - share * (credit_legs - 1)
                } else {
                    share
                };
                legs.push((Direction::Credit, Money::from_minor(minor, Currency::EUR)));
            }
            legs
        })
}

/// Strategy for an unbalanced pair: the credit differs from the debit
pub fn unbalanced_pair_strategy() -> impl Strategy<Value = (Money, Money)> {
    (positive_amount_minor_strategy(), 1i64..1_000i64, any::<bool>()).prop_map(
        |(debit, delta, over)| {
            let credit = if over { debit + delta } else { (debit - delta).max(1) };
            let credit = if credit == debit { debit + 1 } else { credit };
            (
                Money::from_minor(debit, Currency::EUR),
                Money::from_minor(credit, Currency::EUR),
            )
        },
    )
}

#[cfg(test)]
mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn balanced_legs_sum_to_zero(legs in balanced_legs_strategy()) {
            let signed: i64 = legs
                .iter()
                .map(|(direction, money)| {
                    let minor = (money.amount() * rust_decimal::Decimal::from(100)).trunc();
                    let minor: i64 = minor.try_into().unwrap();
                    match direction {
                        Direction::Debit => minor,
                        Direction::Credit => -minor,
                    }
                })
                .sum();
            prop_assert_eq!(signed, 0);
            prop_assert!(legs.iter().all(|(_, m)| m.is_positive()));
        }
    }
}
