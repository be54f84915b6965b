//! Cash register (till) ledger
//!
//! A register owns an opening amount and a running movement history, and
//! derives per-payment-method totals from that history. The derived totals
//! are a pure function of the movements: recomputing them for the same
//! history always yields the same result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;
use uuid::Uuid;

use core_kernel::{
    BranchId, CashMovementId, CashRegisterId, Money, MoneyError, PaymentMethodId, UserId,
};

use crate::error::LedgerError;
use crate::movement_type::{MovementDirection, MovementKind, MovementType, MovementTypeRegistry};
use crate::payment_method::{PaymentMethod, PaymentMethodCatalog, UNDEFINED_METHOD};

/// Lifecycle state of a cash register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterStatus {
    Open,
    Closed,
}

impl RegisterStatus {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            RegisterStatus::Open => "open",
            RegisterStatus::Closed => "closed",
        }
    }
}

impl std::str::FromStr for RegisterStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(RegisterStatus::Open),
            "closed" => Ok(RegisterStatus::Closed),
            other => Err(LedgerError::InvalidStatus(format!(
                "unknown register status '{other}'"
            ))),
        }
    }
}

/// An immutable cash movement record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: CashMovementId,
    pub register_id: CashRegisterId,
    pub movement_type_id: core_kernel::MovementTypeId,
    /// Snapshot of the (immutable) movement type
    pub kind: MovementKind,
    pub direction: MovementDirection,
    pub is_system: bool,
    pub payment_method_id: Option<PaymentMethodId>,
    pub amount: Money,
    /// False marks an informational entry excluded from balance recomputation
    pub affects_balance: bool,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

/// Result of reconciling a register against its movement history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterTotals {
    /// Opening amount plus all cash-classified movements
    pub expected_cash_balance: Money,
    /// Signed totals per payment method name; "Undefined" buckets
    /// movements recorded without a method
    pub payment_method_totals: BTreeMap<String, Money>,
    /// `final_amount - expected_cash_balance`; informational only
    pub cash_difference: Option<Money>,
}

/// A cash register with its movement history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashRegister {
    pub id: CashRegisterId,
    pub branch_id: BranchId,
    pub user_id: UserId,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub initial_amount: Money,
    pub final_amount: Option<Money>,
    pub expected_cash_balance: Option<Money>,
    pub cash_difference: Option<Money>,
    pub status: RegisterStatus,
    movements: Vec<CashMovement>,
}

impl CashRegister {
    /// Opens a register and writes the automatic opening entry
    ///
    /// The opening entry documents the float handed to the cashier; being a
    /// system type it never feeds the derived totals, which already start
    /// from `initial_amount`.
    pub fn open(
        branch_id: BranchId,
        user_id: UserId,
        initial_amount: Money,
        types: &MovementTypeRegistry,
    ) -> Result<Self, LedgerError> {
        let mut register = Self {
            id: CashRegisterId::new_v7(),
            branch_id,
            user_id,
            opened_at: Utc::now(),
            closed_at: None,
            initial_amount,
            final_amount: None,
            expected_cash_balance: None,
            cash_difference: None,
            status: RegisterStatus::Open,
            movements: Vec::new(),
        };

        let auto_open = types.by_kind(MovementKind::RegisterAutoOpen)?;
        register.record_movement(auto_open, initial_amount, None, true, user_id, None)?;

        Ok(register)
    }

    /// Rehydrates a register from persisted state
    pub fn from_parts(
        id: CashRegisterId,
        branch_id: BranchId,
        user_id: UserId,
        opened_at: DateTime<Utc>,
        initial_amount: Money,
        status: RegisterStatus,
        movements: Vec<CashMovement>,
    ) -> Self {
        Self {
            id,
            branch_id,
            user_id,
            opened_at,
            closed_at: None,
            initial_amount,
            final_amount: None,
            expected_cash_balance: None,
            cash_difference: None,
            status,
            movements,
        }
    }

    /// Returns the register currency
    pub fn currency(&self) -> core_kernel::Currency {
        self.initial_amount.currency()
    }

    /// Returns the movement history, oldest first
    pub fn movements(&self) -> &[CashMovement] {
        &self.movements
    }

    /// Appends a cash movement
    ///
    /// # Errors
    ///
    /// - `RegisterClosed` when the register is not open
    /// - `InvalidAmount` for negative amounts
    /// - `InvalidMovementType` for inactive types or types that do not
    ///   participate in cash totals
    pub fn record_movement(
        &mut self,
        movement_type: &MovementType,
        amount: Money,
        payment_method: Option<&PaymentMethod>,
        affects_balance: bool,
        user_id: UserId,
        reference: Option<(String, Uuid)>,
    ) -> Result<&CashMovement, LedgerError> {
        if self.status == RegisterStatus::Closed {
            return Err(LedgerError::RegisterClosed(self.id));
        }
        if amount.currency() != self.currency() {
            return Err(MoneyError::CurrencyMismatch(
                self.currency().code().to_string(),
                amount.currency().code().to_string(),
            )
            .into());
        }
        if amount.is_negative() {
            return Err(LedgerError::InvalidAmount(format!(
                "cash movement amount must be non-negative, got {}",
                amount.amount()
            )));
        }
        if !movement_type.is_active {
            return Err(LedgerError::InvalidMovementType(format!(
                "{} is inactive",
                movement_type.name
            )));
        }
        if !movement_type.affects_cash {
            return Err(LedgerError::InvalidMovementType(format!(
                "{} does not affect cash registers",
                movement_type.name
            )));
        }

        let (reference_type, reference_id) = match reference {
            Some((ty, id)) => (Some(ty), Some(id)),
            None => (None, None),
        };

        let movement = CashMovement {
            id: CashMovementId::new_v7(),
            register_id: self.id,
            movement_type_id: movement_type.id,
            kind: movement_type.kind,
            direction: movement_type.direction,
            is_system: movement_type.is_system,
            payment_method_id: payment_method.map(|m| m.id),
            amount,
            affects_balance,
            reference_type,
            reference_id,
            user_id,
            created_at: Utc::now(),
        };

        info!(
            register = %self.id,
            kind = ?movement.kind,
            amount = %amount.amount(),
            method = payment_method.map(|m| m.name.as_str()).unwrap_or(UNDEFINED_METHOD),
            "cash movement recorded"
        );

        self.movements.push(movement);
        Ok(self.movements.last().expect("movement just pushed"))
    }

    /// Reconciles the register against its movement history
    ///
    /// Starting from `initial_amount`, walks every balance-affecting,
    /// non-system movement: the signed amount accumulates into the bucket of
    /// its payment method name ("Undefined" when absent), and only
    /// cash-classified methods contribute to the expected cash balance.
    /// Pure over the history: re-running on an unchanged register yields
    /// identical totals.
    pub fn recalculate(&self, methods: &PaymentMethodCatalog) -> RegisterTotals {
        let currency = self.currency();
        let mut expected_cash = self.initial_amount;
        let mut totals: BTreeMap<String, Money> = BTreeMap::new();

        for movement in &self.movements {
            if !movement.affects_balance || movement.is_system {
                continue;
            }

            let signed = match movement.direction {
                MovementDirection::Inflow => movement.amount,
                MovementDirection::Outflow => -movement.amount,
            };

            let method = movement.payment_method_id.and_then(|id| methods.get(id));
            let bucket = method
                .map(|m| m.name.clone())
                .unwrap_or_else(|| UNDEFINED_METHOD.to_string());

            let entry = totals.entry(bucket).or_insert_with(|| Money::zero(currency));
            *entry = *entry + signed;

            if method.is_some_and(|m| m.is_cash()) {
                expected_cash = expected_cash + signed;
            }
        }

        RegisterTotals {
            expected_cash_balance: expected_cash,
            payment_method_totals: totals,
            cash_difference: self
                .final_amount
                .map(|declared| declared - expected_cash),
        }
    }

    /// Closes the register, snapshotting the derived totals
    ///
    /// A declared `final_amount` yields a `cash_difference`; any difference
    /// is informational and never blocks closing.
    pub fn close(
        &mut self,
        final_amount: Option<Money>,
        methods: &PaymentMethodCatalog,
    ) -> Result<RegisterTotals, LedgerError> {
        if self.status == RegisterStatus::Closed {
            return Err(LedgerError::RegisterClosed(self.id));
        }
        if let Some(declared) = final_amount {
            if declared.currency() != self.currency() {
                return Err(MoneyError::CurrencyMismatch(
                    self.currency().code().to_string(),
                    declared.currency().code().to_string(),
                )
                .into());
            }
        }

        self.final_amount = final_amount;
        let totals = self.recalculate(methods);

        self.expected_cash_balance = Some(totals.expected_cash_balance);
        self.cash_difference = totals.cash_difference;
        self.closed_at = Some(Utc::now());
        self.status = RegisterStatus::Closed;

        info!(
            register = %self.id,
            expected = %totals.expected_cash_balance.amount(),
            difference = ?totals.cash_difference.map(|d| d.amount()),
            "cash register closed"
        );

        Ok(totals)
    }
}
