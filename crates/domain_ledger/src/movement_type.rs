//! Movement type catalog
//!
//! A closed catalog of named movement kinds. Each kind carries a direction
//! and flags telling which books it participates in. Types are immutable once
//! referenced by a movement; corrections happen through new offsetting
//! movements, never by editing the type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::MovementTypeId;

use crate::error::LedgerError;

/// Direction of a movement type
///
/// Inflow reduces a customer's debt and increases cash; outflow increases
/// debt and decreases cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementDirection {
    Inflow,
    Outflow,
}

impl MovementDirection {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementDirection::Inflow => "inflow",
            MovementDirection::Outflow => "outflow",
        }
    }
}

impl std::str::FromStr for MovementDirection {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inflow" => Ok(MovementDirection::Inflow),
            "outflow" => Ok(MovementDirection::Outflow),
            other => Err(LedgerError::InvalidMovementType(format!(
                "unknown direction '{other}'"
            ))),
        }
    }
}

/// The closed set of movement kinds the system understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// A sale settled through the current account
    Sale,
    /// A payment received from the customer
    Payment,
    /// A surcharge applied on top of a sale total
    Surcharge,
    /// Interest accrued on outstanding debt
    Interest,
    /// Manual adjustment increasing the customer's debt
    DebitAdjustment,
    /// Manual adjustment in the customer's favor
    CreditAdjustment,
    /// Cash put into the drawer outside a sale
    Deposit,
    /// Cash taken out of the drawer
    Withdrawal,
    /// Petty expense paid from the drawer
    Expense,
    /// Bookkeeping entry written when a register opens
    RegisterAutoOpen,
    /// Bookkeeping entry written when a register closes
    RegisterAutoClose,
    /// Bookkeeping correction generated by the system
    SystemAdjustment,
}

impl MovementKind {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Sale => "sale",
            MovementKind::Payment => "payment",
            MovementKind::Surcharge => "surcharge",
            MovementKind::Interest => "interest",
            MovementKind::DebitAdjustment => "debit_adjustment",
            MovementKind::CreditAdjustment => "credit_adjustment",
            MovementKind::Deposit => "deposit",
            MovementKind::Withdrawal => "withdrawal",
            MovementKind::Expense => "expense",
            MovementKind::RegisterAutoOpen => "register_auto_open",
            MovementKind::RegisterAutoClose => "register_auto_close",
            MovementKind::SystemAdjustment => "system_adjustment",
        }
    }
}

impl std::str::FromStr for MovementKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(MovementKind::Sale),
            "payment" => Ok(MovementKind::Payment),
            "surcharge" => Ok(MovementKind::Surcharge),
            "interest" => Ok(MovementKind::Interest),
            "debit_adjustment" => Ok(MovementKind::DebitAdjustment),
            "credit_adjustment" => Ok(MovementKind::CreditAdjustment),
            "deposit" => Ok(MovementKind::Deposit),
            "withdrawal" => Ok(MovementKind::Withdrawal),
            "expense" => Ok(MovementKind::Expense),
            "register_auto_open" => Ok(MovementKind::RegisterAutoOpen),
            "register_auto_close" => Ok(MovementKind::RegisterAutoClose),
            "system_adjustment" => Ok(MovementKind::SystemAdjustment),
            other => Err(LedgerError::InvalidMovementType(format!(
                "unknown movement kind '{other}'"
            ))),
        }
    }
}

/// A movement type definition
///
/// `is_surcharge` and `is_system` are explicit flags; classification never
/// depends on matching the display name, which is kept only for legacy data
/// and receipts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementType {
    pub id: MovementTypeId,
    pub kind: MovementKind,
    pub name: String,
    pub direction: MovementDirection,
    pub affects_cash: bool,
    pub affects_current_account: bool,
    pub is_surcharge: bool,
    pub is_system: bool,
    pub is_active: bool,
}

impl MovementType {
    /// Creates a new movement type definition
    pub fn new(kind: MovementKind, name: impl Into<String>, direction: MovementDirection) -> Self {
        Self {
            id: MovementTypeId::new_v7(),
            kind,
            name: name.into(),
            direction,
            affects_cash: false,
            affects_current_account: false,
            is_surcharge: false,
            is_system: false,
            is_active: true,
        }
    }

    /// Marks the type as participating in cash-register totals
    pub fn affecting_cash(mut self) -> Self {
        self.affects_cash = true;
        self
    }

    /// Marks the type as participating in current-account balances
    pub fn affecting_current_account(mut self) -> Self {
        self.affects_current_account = true;
        self
    }

    /// Flags the type as a sale surcharge
    pub fn as_surcharge(mut self) -> Self {
        self.is_surcharge = true;
        self
    }

    /// Flags the type as system-generated bookkeeping
    pub fn as_system(mut self) -> Self {
        self.is_system = true;
        self
    }

    /// Returns true for inflow types
    pub fn is_inflow(&self) -> bool {
        self.direction == MovementDirection::Inflow
    }
}

/// The movement type catalog
///
/// Owned and edited outside this core; loaded here as read-only reference
/// data. Kinds are unique within a registry.
#[derive(Debug, Clone, Default)]
pub struct MovementTypeRegistry {
    by_id: HashMap<MovementTypeId, MovementType>,
    by_kind: HashMap<MovementKind, MovementTypeId>,
}

impl MovementTypeRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the standard catalog with the legacy display names
    pub fn standard() -> Self {
        let mut registry = Self::new();

        let types = vec![
            MovementType::new(MovementKind::Sale, "Venta", MovementDirection::Outflow)
                .affecting_current_account(),
            MovementType::new(MovementKind::Payment, "Pago", MovementDirection::Inflow)
                .affecting_current_account()
                .affecting_cash(),
            MovementType::new(MovementKind::Surcharge, "Recargo", MovementDirection::Outflow)
                .affecting_current_account()
                .as_surcharge(),
            MovementType::new(MovementKind::Interest, "Interés", MovementDirection::Outflow)
                .affecting_current_account(),
            MovementType::new(
                MovementKind::DebitAdjustment,
                "Ajuste en contra",
                MovementDirection::Outflow,
            )
            .affecting_current_account(),
            MovementType::new(
                MovementKind::CreditAdjustment,
                "Ajuste a favor",
                MovementDirection::Inflow,
            )
            .affecting_current_account(),
            MovementType::new(
                MovementKind::Deposit,
                "Ingreso de efectivo",
                MovementDirection::Inflow,
            )
            .affecting_cash(),
            MovementType::new(
                MovementKind::Withdrawal,
                "Retiro de efectivo",
                MovementDirection::Outflow,
            )
            .affecting_cash(),
            MovementType::new(MovementKind::Expense, "Gasto", MovementDirection::Outflow)
                .affecting_cash(),
            MovementType::new(
                MovementKind::RegisterAutoOpen,
                "Apertura automática",
                MovementDirection::Inflow,
            )
            .affecting_cash()
            .as_system(),
            MovementType::new(
                MovementKind::RegisterAutoClose,
                "Cierre automático",
                MovementDirection::Outflow,
            )
            .affecting_cash()
            .as_system(),
            MovementType::new(
                MovementKind::SystemAdjustment,
                "Ajuste del sistema",
                MovementDirection::Inflow,
            )
            .affecting_cash()
            .as_system(),
        ];

        for ty in types {
            registry
                .register(ty)
                .expect("standard catalog has no duplicate kinds");
        }

        registry
    }

    /// Adds a type to the catalog
    ///
    /// # Errors
    ///
    /// Returns `DuplicateMovementType` if the kind or id is already present.
    pub fn register(&mut self, movement_type: MovementType) -> Result<(), LedgerError> {
        if self.by_kind.contains_key(&movement_type.kind)
            || self.by_id.contains_key(&movement_type.id)
        {
            return Err(LedgerError::DuplicateMovementType(format!(
                "{:?}",
                movement_type.kind
            )));
        }

        self.by_kind.insert(movement_type.kind, movement_type.id);
        self.by_id.insert(movement_type.id, movement_type);
        Ok(())
    }

    /// Looks a type up by id
    pub fn get(&self, id: MovementTypeId) -> Result<&MovementType, LedgerError> {
        self.by_id
            .get(&id)
            .ok_or_else(|| LedgerError::UnknownMovementType(id.to_string()))
    }

    /// Looks a type up by kind
    pub fn by_kind(&self, kind: MovementKind) -> Result<&MovementType, LedgerError> {
        self.by_kind
            .get(&kind)
            .and_then(|id| self.by_id.get(id))
            .ok_or_else(|| LedgerError::UnknownMovementType(format!("{:?}", kind)))
    }

    /// Retires a type from further use; existing movements keep referring to it
    pub fn deactivate(&mut self, id: MovementTypeId) -> Result<(), LedgerError> {
        let ty = self
            .by_id
            .get_mut(&id)
            .ok_or_else(|| LedgerError::UnknownMovementType(id.to_string()))?;
        ty.is_active = false;
        Ok(())
    }

    /// Iterates over all definitions
    pub fn iter(&self) -> impl Iterator<Item = &MovementType> {
        self.by_id.values()
    }
}
