//! Proportional credit allocation
//!
//! Splits a credit amount across payment targets in proportion to their
//! pending balances, rounding each share to the currency's precision and
//! guaranteeing that exactly `min(credit, total pending)` is assigned.

use core_kernel::Money;

use crate::error::PaymentError;

/// Distributes `credit` across targets proportionally to `pendings`
///
/// All targets but the last receive `round(credit * pending_i / total)`,
/// capped at their own pending amount; the last target absorbs the remainder.
/// A final top-up pass re-spreads any remainder the caps pushed out, so the
/// result always sums to exactly `min(credit, total pending)`.
///
/// # Errors
///
/// - `EmptySelection` when `pendings` is empty
/// - `InvalidAmount` when the credit is not positive or no target has a
///   pending balance
pub fn distribute_proportionally(
    credit: Money,
    pendings: &[Money],
) -> Result<Vec<Money>, PaymentError> {
    if pendings.is_empty() {
        return Err(PaymentError::EmptySelection);
    }
    if !credit.is_positive() {
        return Err(PaymentError::InvalidAmount(format!(
            "credit to distribute must be positive, got {}",
            credit.amount()
        )));
    }

    let currency = credit.currency();
    let mut total_pending = Money::zero(currency);
    for pending in pendings {
        if pending.is_negative() {
            return Err(PaymentError::InvalidAmount(format!(
                "pending amount must be non-negative, got {}",
                pending.amount()
            )));
        }
        total_pending = total_pending.checked_add(pending)?;
    }
    if !total_pending.is_positive() {
        return Err(PaymentError::InvalidAmount(
            "no pending balance to allocate against".to_string(),
        ));
    }

    let target_sum = credit.checked_min(&total_pending)?;
    let mut shares = Vec::with_capacity(pendings.len());
    let mut remaining = target_sum;

    for (i, pending) in pendings.iter().enumerate() {
        let share = if i + 1 == pendings.len() {
            // Last target absorbs the remainder, capped at its own pending
            remaining.checked_min(pending)?
        } else {
            let ratio = pending.amount() / total_pending.amount();
            let proportional = credit.multiply(ratio).round_to_currency();
            proportional
                .checked_min(pending)?
                .checked_min(&remaining)?
        };
        remaining = remaining.checked_sub(&share)?;
        shares.push(share);
    }

    // Rounding can leave dust when the last target's cap bites; spread it
    // over targets that still have headroom.
    if remaining.is_positive() {
        for (share, pending) in shares.iter_mut().zip(pendings) {
            let headroom = pending.checked_sub(share)?;
            if headroom.is_positive() {
                let top_up = remaining.checked_min(&headroom)?;
                *share = share.checked_add(&top_up)?;
                remaining = remaining.checked_sub(&top_up)?;
                if !remaining.is_positive() {
                    break;
                }
            }
        }
    }

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn ars(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::ARS)
    }

    #[test]
    fn test_reference_distribution() {
        let shares = distribute_proportionally(
            ars(dec!(120)),
            &[ars(dec!(100)), ars(dec!(50)), ars(dec!(25))],
        )
        .unwrap();

        assert_eq!(shares[0].amount(), dec!(68.57));
        assert_eq!(shares[1].amount(), dec!(34.29));
        assert_eq!(shares[2].amount(), dec!(17.14));
    }

    #[test]
    fn test_credit_covering_everything_pays_in_full() {
        let shares = distribute_proportionally(
            ars(dec!(500)),
            &[ars(dec!(100)), ars(dec!(50)), ars(dec!(25))],
        )
        .unwrap();

        assert_eq!(shares[0].amount(), dec!(100));
        assert_eq!(shares[1].amount(), dec!(50));
        assert_eq!(shares[2].amount(), dec!(25));
    }

    #[test]
    fn test_single_target_gets_min_of_credit_and_pending() {
        let shares = distribute_proportionally(ars(dec!(80)), &[ars(dec!(100))]).unwrap();
        assert_eq!(shares[0].amount(), dec!(80));

        let shares = distribute_proportionally(ars(dec!(120)), &[ars(dec!(100))]).unwrap();
        assert_eq!(shares[0].amount(), dec!(100));
    }

    #[test]
    fn test_zero_pending_target_receives_nothing() {
        let shares = distribute_proportionally(
            ars(dec!(60)),
            &[ars(dec!(0)), ars(dec!(90))],
        )
        .unwrap();

        assert_eq!(shares[0].amount(), dec!(0));
        assert_eq!(shares[1].amount(), dec!(60));
    }

    #[test]
    fn test_empty_targets_rejected() {
        assert!(matches!(
            distribute_proportionally(ars(dec!(10)), &[]),
            Err(PaymentError::EmptySelection)
        ));
    }

    #[test]
    fn test_non_positive_credit_rejected() {
        assert!(matches!(
            distribute_proportionally(ars(dec!(0)), &[ars(dec!(10))]),
            Err(PaymentError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_all_zero_pendings_rejected() {
        assert!(matches!(
            distribute_proportionally(ars(dec!(10)), &[ars(dec!(0)), ars(dec!(0))]),
            Err(PaymentError::InvalidAmount(_))
        ));
    }
}
