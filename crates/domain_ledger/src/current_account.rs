//! Customer current-account ledger
//!
//! A current account owns a customer's credit limit and running balance and
//! appends immutable movement records. A positive balance means the customer
//! owes money; a negative balance is a credit in the customer's favor.
//!
//! # Invariants
//!
//! - `current_balance` equals the sum of signed movement amounts since opening
//! - Each movement's `balance_before` equals the previous movement's
//!   `balance_after` (total order per account)
//! - Movements are never mutated or deleted; corrections are new offsetting
//!   movements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use core_kernel::{CurrentAccountId, CustomerId, Money, MovementId, SaleId};

use crate::error::LedgerError;
use crate::movement_type::{MovementDirection, MovementKind, MovementType};

/// Lifecycle state of a current account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Suspended,
    Closed,
}

impl AccountStatus {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
            AccountStatus::Closed => "closed",
        }
    }
}

impl std::str::FromStr for AccountStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "suspended" => Ok(AccountStatus::Suspended),
            "closed" => Ok(AccountStatus::Closed),
            other => Err(LedgerError::InvalidStatus(format!(
                "unknown account status '{other}'"
            ))),
        }
    }
}

/// An immutable current-account movement record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAccountMovement {
    pub id: MovementId,
    pub account_id: CurrentAccountId,
    pub movement_type_id: core_kernel::MovementTypeId,
    /// Snapshot of the (immutable) movement type, so replay never needs the catalog
    pub kind: MovementKind,
    pub direction: MovementDirection,
    pub amount: Money,
    pub balance_before: Money,
    pub balance_after: Money,
    pub sale_id: Option<SaleId>,
    pub reference: Option<String>,
    pub metadata: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl CurrentAccountMovement {
    /// Returns true for movements flagged as sale surcharges
    pub fn is_surcharge(&self) -> bool {
        self.kind == MovementKind::Surcharge
    }
}

/// Optional attributes of a movement being applied
#[derive(Debug, Clone, Default)]
pub struct MovementDetail {
    sale_id: Option<SaleId>,
    reference: Option<String>,
    metadata: BTreeMap<String, Value>,
    over_limit_authorized: bool,
}

impl MovementDetail {
    /// Creates an empty detail
    pub fn new() -> Self {
        Self::default()
    }

    /// Links the movement to a sale
    pub fn for_sale(mut self, sale_id: SaleId) -> Self {
        self.sale_id = Some(sale_id);
        self
    }

    /// Sets a free-form reference (receipt number, charge id)
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Attaches a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Administrative override: allows an outflow past the credit limit
    pub fn authorize_over_limit(mut self) -> Self {
        self.over_limit_authorized = true;
        self
    }
}

/// A customer current account with its movement history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAccount {
    pub id: CurrentAccountId,
    pub customer_id: CustomerId,
    /// None means unlimited credit
    pub credit_limit: Option<Money>,
    current_balance: Money,
    pub status: AccountStatus,
    movements: Vec<CurrentAccountMovement>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CurrentAccount {
    /// Opens a new account with a zero balance and unlimited credit
    pub fn new(customer_id: CustomerId, currency: core_kernel::Currency) -> Self {
        let now = Utc::now();
        Self {
            id: CurrentAccountId::new_v7(),
            customer_id,
            credit_limit: None,
            current_balance: Money::zero(currency),
            status: AccountStatus::Active,
            movements: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the credit limit
    pub fn with_credit_limit(mut self, limit: Money) -> Self {
        self.credit_limit = Some(limit);
        self
    }

    /// Returns the running balance
    pub fn current_balance(&self) -> Money {
        self.current_balance
    }

    /// Returns the account currency
    pub fn currency(&self) -> core_kernel::Currency {
        self.current_balance.currency()
    }

    /// Returns the movement history, oldest first
    pub fn movements(&self) -> &[CurrentAccountMovement] {
        &self.movements
    }

    /// Rehydrates an account from persisted state
    ///
    /// The caller is responsible for handing over movements in creation
    /// order; `verify_balance_chain` will expose any gap.
    pub fn from_parts(
        id: CurrentAccountId,
        customer_id: CustomerId,
        credit_limit: Option<Money>,
        current_balance: Money,
        status: AccountStatus,
        movements: Vec<CurrentAccountMovement>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            customer_id,
            credit_limit,
            current_balance,
            status,
            movements,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when a debt increase of `amount` stays within the credit limit
    pub fn has_available_credit(&self, amount: Money) -> bool {
        match self.credit_limit {
            None => true,
            Some(limit) => match self.current_balance.checked_add(&amount) {
                Ok(projected) => projected.amount() <= limit.amount(),
                Err(_) => false,
            },
        }
    }

    /// Credit the customer can still draw on, None when unlimited
    pub fn available_credit(&self) -> Option<Money> {
        self.credit_limit.map(|limit| limit - self.current_balance)
    }

    /// Usable favor credit: the magnitude of a negative balance, floored at zero
    pub fn available_favor_credit(&self) -> Money {
        if self.current_balance.is_negative() {
            self.current_balance.abs()
        } else {
            Money::zero(self.currency())
        }
    }

    /// Appends a movement and advances the running balance
    ///
    /// Both effects happen together; when persisted, the caller wraps them in
    /// a single transaction so the balance chain survives concurrent writers.
    ///
    /// # Errors
    ///
    /// - `AccountClosed` / `AccountSuspended` when the account is not active
    /// - `InvalidAmount` for negative amounts
    /// - `InvalidMovementType` for inactive types or types that do not
    ///   participate in current-account balances
    /// - `InsufficientCredit` when an outflow exceeds the limit and the
    ///   detail carries no override
    pub fn apply_movement(
        &mut self,
        movement_type: &MovementType,
        amount: Money,
        detail: MovementDetail,
    ) -> Result<&CurrentAccountMovement, LedgerError> {
        match self.status {
            AccountStatus::Active => {}
            AccountStatus::Suspended => return Err(LedgerError::AccountSuspended(self.id)),
            AccountStatus::Closed => return Err(LedgerError::AccountClosed(self.id)),
        }

        if amount.is_negative() {
            return Err(LedgerError::InvalidAmount(format!(
                "movement amount must be non-negative, got {}",
                amount.amount()
            )));
        }
        if !movement_type.is_active {
            return Err(LedgerError::InvalidMovementType(format!(
                "{} is inactive",
                movement_type.name
            )));
        }
        if !movement_type.affects_current_account {
            return Err(LedgerError::InvalidMovementType(format!(
                "{} does not affect current accounts",
                movement_type.name
            )));
        }

        if movement_type.direction == MovementDirection::Outflow
            && !detail.over_limit_authorized
            && !self.has_available_credit(amount)
        {
            let available = self
                .available_credit()
                .map(|m| m.amount())
                .unwrap_or_default();
            return Err(LedgerError::InsufficientCredit {
                requested: amount.amount(),
                available,
            });
        }

        let balance_before = self.current_balance;
        let balance_after = match movement_type.direction {
            MovementDirection::Outflow => balance_before.checked_add(&amount)?,
            MovementDirection::Inflow => balance_before.checked_sub(&amount)?,
        };

        let movement = CurrentAccountMovement {
            id: MovementId::new_v7(),
            account_id: self.id,
            movement_type_id: movement_type.id,
            kind: movement_type.kind,
            direction: movement_type.direction,
            amount,
            balance_before,
            balance_after,
            sale_id: detail.sale_id,
            reference: detail.reference,
            metadata: detail.metadata,
            created_at: Utc::now(),
        };

        info!(
            account = %self.id,
            kind = ?movement.kind,
            amount = %amount.amount(),
            balance_after = %balance_after.amount(),
            "current-account movement applied"
        );

        self.current_balance = balance_after;
        self.updated_at = movement.created_at;
        self.movements.push(movement);

        Ok(self.movements.last().expect("movement just pushed"))
    }

    /// Replays the movement history and checks the balance chain
    ///
    /// Detects any gap or overlap: each movement's `balance_before` must
    /// equal the previous movement's `balance_after`, every step must move by
    /// exactly the signed amount, and the final balance must match
    /// `current_balance`.
    pub fn verify_balance_chain(&self) -> Result<(), LedgerError> {
        let mut expected = Money::zero(self.currency());

        for movement in &self.movements {
            if movement.balance_before != expected {
                return Err(LedgerError::BalanceChainViolation(format!(
                    "movement {} starts at {} but previous balance was {}",
                    movement.id,
                    movement.balance_before.amount(),
                    expected.amount()
                )));
            }

            let step = match movement.direction {
                MovementDirection::Outflow => movement.balance_before.checked_add(&movement.amount),
                MovementDirection::Inflow => movement.balance_before.checked_sub(&movement.amount),
            }?;

            if movement.balance_after != step {
                return Err(LedgerError::BalanceChainViolation(format!(
                    "movement {} records balance_after {} but amount implies {}",
                    movement.id,
                    movement.balance_after.amount(),
                    step.amount()
                )));
            }

            expected = movement.balance_after;
        }

        if expected != self.current_balance {
            return Err(LedgerError::BalanceChainViolation(format!(
                "final movement balance {} does not match current balance {}",
                expected.amount(),
                self.current_balance.amount()
            )));
        }

        Ok(())
    }

    /// Suspends the account; movements are rejected until reactivation
    pub fn suspend(&mut self) {
        if self.status == AccountStatus::Active {
            self.status = AccountStatus::Suspended;
            self.updated_at = Utc::now();
        }
    }

    /// Reactivates a suspended account
    pub fn reactivate(&mut self) {
        if self.status == AccountStatus::Suspended {
            self.status = AccountStatus::Active;
            self.updated_at = Utc::now();
        }
    }

    /// Closes the account permanently
    pub fn close(&mut self) {
        self.status = AccountStatus::Closed;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement_type::{MovementKind, MovementTypeRegistry};
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn account() -> CurrentAccount {
        CurrentAccount::new(CustomerId::new(), Currency::ARS)
    }

    fn registry() -> MovementTypeRegistry {
        MovementTypeRegistry::standard()
    }

    #[test]
    fn test_outflow_increases_debt() {
        let registry = registry();
        let mut account = account();
        let sale = registry.by_kind(MovementKind::Sale).unwrap();

        account
            .apply_movement(
                sale,
                Money::new(dec!(100), Currency::ARS),
                MovementDetail::new(),
            )
            .unwrap();

        assert_eq!(account.current_balance().amount(), dec!(100));
    }

    #[test]
    fn test_inflow_reduces_debt() {
        let registry = registry();
        let mut account = account();
        let sale = registry.by_kind(MovementKind::Sale).unwrap();
        let payment = registry.by_kind(MovementKind::Payment).unwrap();

        account
            .apply_movement(
                sale,
                Money::new(dec!(100), Currency::ARS),
                MovementDetail::new(),
            )
            .unwrap();
        account
            .apply_movement(
                payment,
                Money::new(dec!(130), Currency::ARS),
                MovementDetail::new(),
            )
            .unwrap();

        assert_eq!(account.current_balance().amount(), dec!(-30));
        assert_eq!(account.available_favor_credit().amount(), dec!(30));
    }

    #[test]
    fn test_credit_limit_boundary() {
        let registry = registry();
        let mut account =
            account().with_credit_limit(Money::new(dec!(1000), Currency::ARS));
        let sale = registry.by_kind(MovementKind::Sale).unwrap();

        account
            .apply_movement(
                sale,
                Money::new(dec!(950), Currency::ARS),
                MovementDetail::new(),
            )
            .unwrap();

        // Exactly at the limit is allowed
        account
            .apply_movement(
                sale,
                Money::new(dec!(50), Currency::ARS),
                MovementDetail::new(),
            )
            .unwrap();
        assert_eq!(account.current_balance().amount(), dec!(1000));

        // One cent over is rejected
        let result = account.apply_movement(
            sale,
            Money::new(dec!(0.01), Currency::ARS),
            MovementDetail::new(),
        );
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientCredit { .. })
        ));
    }

    #[test]
    fn test_over_limit_override() {
        let registry = registry();
        let mut account = account().with_credit_limit(Money::zero(Currency::ARS));
        let sale = registry.by_kind(MovementKind::Sale).unwrap();

        account
            .apply_movement(
                sale,
                Money::new(dec!(10), Currency::ARS),
                MovementDetail::new().authorize_over_limit(),
            )
            .unwrap();

        assert_eq!(account.current_balance().amount(), dec!(10));
    }

    #[test]
    fn test_closed_account_rejects_movements() {
        let registry = registry();
        let mut account = account();
        let sale = registry.by_kind(MovementKind::Sale).unwrap();

        account.close();
        let result = account.apply_movement(
            sale,
            Money::new(dec!(10), Currency::ARS),
            MovementDetail::new(),
        );

        assert!(matches!(result, Err(LedgerError::AccountClosed(_))));
    }

    #[test]
    fn test_suspended_account_rejects_movements() {
        let registry = registry();
        let mut account = account();
        let sale = registry.by_kind(MovementKind::Sale).unwrap();

        account.suspend();
        assert!(matches!(
            account.apply_movement(
                sale,
                Money::new(dec!(10), Currency::ARS),
                MovementDetail::new()
            ),
            Err(LedgerError::AccountSuspended(_))
        ));

        account.reactivate();
        assert!(account
            .apply_movement(
                sale,
                Money::new(dec!(10), Currency::ARS),
                MovementDetail::new()
            )
            .is_ok());
    }

    #[test]
    fn test_balance_chain_verification() {
        let registry = registry();
        let mut account = account();
        let sale = registry.by_kind(MovementKind::Sale).unwrap();
        let payment = registry.by_kind(MovementKind::Payment).unwrap();

        for (ty, amount) in [
            (sale, dec!(120)),
            (payment, dec!(70)),
            (sale, dec!(33.33)),
            (payment, dec!(83.33)),
        ] {
            account
                .apply_movement(ty, Money::new(amount, Currency::ARS), MovementDetail::new())
                .unwrap();
        }

        account.verify_balance_chain().unwrap();
        assert_eq!(account.current_balance().amount(), dec!(0));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let registry = registry();
        let mut account = account();
        let sale = registry.by_kind(MovementKind::Sale).unwrap();

        let result = account.apply_movement(
            sale,
            Money::new(dec!(-5), Currency::ARS),
            MovementDetail::new(),
        );
        assert!(matches!(result, Err(LedgerError::InvalidAmount(_))));
    }

    #[test]
    fn test_cash_only_type_rejected() {
        let registry = registry();
        let mut account = account();
        let deposit = registry.by_kind(MovementKind::Deposit).unwrap();

        let result = account.apply_movement(
            deposit,
            Money::new(dec!(5), Currency::ARS),
            MovementDetail::new(),
        );
        assert!(matches!(result, Err(LedgerError::InvalidMovementType(_))));
    }
}
