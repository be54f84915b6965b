//! Administrative charges
//!
//! Interests and debit adjustments already sit on the current account as
//! outflow movements; the charge records here only track how much of each has
//! been settled, so they can be offered as payment targets next to sales.

use serde::{Deserialize, Serialize};

use core_kernel::{ChargeId, CurrentAccountId, Money};
use domain_ledger::{CurrentAccountMovement, MovementKind};

use crate::error::PaymentError;

/// What kind of debt a charge represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeKind {
    Interest,
    DebitAdjustment,
}

impl ChargeKind {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeKind::Interest => "interest",
            ChargeKind::DebitAdjustment => "debit_adjustment",
        }
    }
}

impl std::str::FromStr for ChargeKind {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interest" => Ok(ChargeKind::Interest),
            "debit_adjustment" => Ok(ChargeKind::DebitAdjustment),
            other => Err(PaymentError::InvalidAmount(format!(
                "unknown charge kind '{other}'"
            ))),
        }
    }
}

/// A payable administrative charge against a current account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdministrativeCharge {
    pub id: ChargeId,
    pub account_id: CurrentAccountId,
    pub kind: ChargeKind,
    total_amount: Money,
    paid_amount: Money,
}

impl AdministrativeCharge {
    pub fn new(account_id: CurrentAccountId, kind: ChargeKind, total_amount: Money) -> Self {
        Self {
            id: ChargeId::new(),
            account_id,
            kind,
            total_amount,
            paid_amount: Money::zero(total_amount.currency()),
        }
    }

    /// Rehydrates a charge from persisted state
    pub fn from_parts(
        id: ChargeId,
        account_id: CurrentAccountId,
        kind: ChargeKind,
        total_amount: Money,
        paid_amount: Money,
    ) -> Self {
        Self {
            id,
            account_id,
            kind,
            total_amount,
            paid_amount,
        }
    }

    /// Projects a charge out of an interest or debit-adjustment movement
    ///
    /// The charge id is derived from the movement id, so projecting the same
    /// movement twice yields the same charge.
    pub fn from_movement(movement: &CurrentAccountMovement) -> Option<Self> {
        let kind = match movement.kind {
            MovementKind::Interest => ChargeKind::Interest,
            MovementKind::DebitAdjustment => ChargeKind::DebitAdjustment,
            _ => return None,
        };

        Some(Self {
            id: ChargeId::from_uuid(*movement.id.as_uuid()),
            account_id: movement.account_id,
            kind,
            total_amount: movement.amount,
            paid_amount: Money::zero(movement.amount.currency()),
        })
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    /// Amount still owed, floored at zero
    pub fn pending_amount(&self) -> Money {
        let pending = self.total_amount - self.paid_amount;
        if pending.is_negative() {
            Money::zero(self.total_amount.currency())
        } else {
            pending
        }
    }

    pub fn is_settled(&self) -> bool {
        !self.pending_amount().is_positive()
    }

    /// Registers a settled amount, snapping to fully paid within one minor unit
    pub fn record_payment(&mut self, amount: Money) -> Result<(), PaymentError> {
        if amount.is_negative() {
            return Err(PaymentError::InvalidAmount(format!(
                "charge payment must be non-negative, got {}",
                amount.amount()
            )));
        }

        self.paid_amount = self.paid_amount.checked_add(&amount)?;

        let remainder = self.total_amount.checked_sub(&self.paid_amount)?;
        if remainder.amount() <= self.total_amount.currency().minor_unit()
            && !remainder.is_negative()
        {
            self.paid_amount = self.total_amount;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_payment_leaves_pending() {
        let mut charge = AdministrativeCharge::new(
            CurrentAccountId::new(),
            ChargeKind::Interest,
            Money::new(dec!(30), Currency::ARS),
        );

        charge
            .record_payment(Money::new(dec!(10), Currency::ARS))
            .unwrap();

        assert_eq!(charge.pending_amount().amount(), dec!(20));
        assert!(!charge.is_settled());
    }

    #[test]
    fn test_epsilon_settles_charge() {
        let mut charge = AdministrativeCharge::new(
            CurrentAccountId::new(),
            ChargeKind::DebitAdjustment,
            Money::new(dec!(30), Currency::ARS),
        );

        charge
            .record_payment(Money::new(dec!(29.995), Currency::ARS))
            .unwrap();

        assert!(charge.is_settled());
        assert_eq!(charge.paid_amount().amount(), dec!(30));
    }

    #[test]
    fn test_projection_from_movement_is_stable() {
        let types = domain_ledger::MovementTypeRegistry::standard();
        let interest = types.by_kind(MovementKind::Interest).unwrap();
        let mut account =
            domain_ledger::CurrentAccount::new(core_kernel::CustomerId::new(), Currency::ARS);

        account
            .apply_movement(
                interest,
                Money::new(dec!(12.50), Currency::ARS),
                domain_ledger::MovementDetail::new(),
            )
            .unwrap();

        let movement = &account.movements()[0];
        let a = AdministrativeCharge::from_movement(movement).unwrap();
        let b = AdministrativeCharge::from_movement(movement).unwrap();

        assert_eq!(a.id, b.id);
        assert_eq!(a.kind, ChargeKind::Interest);
        assert_eq!(a.total_amount().amount(), dec!(12.50));
    }

    #[test]
    fn test_payment_movement_is_not_a_charge() {
        let types = domain_ledger::MovementTypeRegistry::standard();
        let payment = types.by_kind(MovementKind::Payment).unwrap();
        let mut account =
            domain_ledger::CurrentAccount::new(core_kernel::CustomerId::new(), Currency::ARS);

        account
            .apply_movement(
                payment,
                Money::new(dec!(10), Currency::ARS),
                domain_ledger::MovementDetail::new(),
            )
            .unwrap();

        assert!(AdministrativeCharge::from_movement(&account.movements()[0]).is_none());
    }
}
