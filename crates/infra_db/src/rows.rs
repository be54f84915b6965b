//! Row types bridging SQL storage and the domain model
//!
//! Enum-like columns are stored as text in their stable string forms; a value
//! that no longer parses is surfaced as `CorruptRow` instead of panicking.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::FromRow;
use std::collections::BTreeMap;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{
    BranchId, CashMovementId, CashRegisterId, ChargeId, Currency, CurrentAccountId, CustomerId,
    Money, MovementId, MovementTypeId, PaymentMethodId, SaleId, UserId,
};
use domain_ledger::{
    AccountStatus, CashMovement, CashRegister, CurrentAccount, CurrentAccountMovement,
    MovementDirection, MovementKind, MovementType, PaymentMethod, PaymentMethodKind,
    RegisterStatus,
};
use domain_payments::{AdministrativeCharge, ChargeKind, Sale, SalePaymentStatus};

use crate::error::DatabaseError;

fn corrupt(context: &str, detail: impl std::fmt::Display) -> DatabaseError {
    DatabaseError::CorruptRow(format!("{context}: {detail}"))
}

fn parse_currency(code: &str) -> Result<Currency, DatabaseError> {
    Currency::from_str(code).map_err(|e| corrupt("currency", e))
}

#[derive(Debug, FromRow)]
pub struct MovementTypeRow {
    pub id: Uuid,
    pub kind: String,
    pub name: String,
    pub direction: String,
    pub affects_cash: bool,
    pub affects_current_account: bool,
    pub is_surcharge: bool,
    pub is_system: bool,
    pub is_active: bool,
}

impl MovementTypeRow {
    pub fn into_domain(self) -> Result<MovementType, DatabaseError> {
        Ok(MovementType {
            id: MovementTypeId::from_uuid(self.id),
            kind: MovementKind::from_str(&self.kind).map_err(|e| corrupt("movement type", e))?,
            name: self.name,
            direction: MovementDirection::from_str(&self.direction)
                .map_err(|e| corrupt("movement type", e))?,
            affects_cash: self.affects_cash,
            affects_current_account: self.affects_current_account,
            is_surcharge: self.is_surcharge,
            is_system: self.is_system,
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct PaymentMethodRow {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub is_active: bool,
}

impl PaymentMethodRow {
    pub fn into_domain(self) -> PaymentMethod {
        PaymentMethod {
            id: PaymentMethodId::from_uuid(self.id),
            kind: PaymentMethodKind::parse(&self.kind),
            name: self.name,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub currency: String,
    pub credit_limit: Option<Decimal>,
    pub current_balance: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountRow {
    pub fn into_domain(
        self,
        movements: Vec<CurrentAccountMovement>,
    ) -> Result<CurrentAccount, DatabaseError> {
        let currency = parse_currency(&self.currency)?;
        Ok(CurrentAccount::from_parts(
            CurrentAccountId::from_uuid(self.id),
            CustomerId::from_uuid(self.customer_id),
            self.credit_limit.map(|limit| Money::new(limit, currency)),
            Money::new(self.current_balance, currency),
            AccountStatus::from_str(&self.status).map_err(|e| corrupt("account", e))?,
            movements,
        ))
    }
}

#[derive(Debug, FromRow)]
pub struct AccountMovementRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub movement_type_id: Uuid,
    pub kind: String,
    pub direction: String,
    pub currency: String,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub sale_id: Option<Uuid>,
    pub reference: Option<String>,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

impl AccountMovementRow {
    pub fn into_domain(self) -> Result<CurrentAccountMovement, DatabaseError> {
        let currency = parse_currency(&self.currency)?;
        let metadata: BTreeMap<String, Value> = match self.metadata {
            Value::Null => BTreeMap::new(),
            other => serde_json::from_value(other)
                .map_err(|e| corrupt("movement metadata", e))?,
        };

        Ok(CurrentAccountMovement {
            id: MovementId::from_uuid(self.id),
            account_id: CurrentAccountId::from_uuid(self.account_id),
            movement_type_id: MovementTypeId::from_uuid(self.movement_type_id),
            kind: MovementKind::from_str(&self.kind).map_err(|e| corrupt("movement", e))?,
            direction: MovementDirection::from_str(&self.direction)
                .map_err(|e| corrupt("movement", e))?,
            amount: Money::new(self.amount, currency),
            balance_before: Money::new(self.balance_before, currency),
            balance_after: Money::new(self.balance_after, currency),
            sale_id: self.sale_id.map(SaleId::from_uuid),
            reference: self.reference,
            metadata,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct RegisterRow {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub user_id: Uuid,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub currency: String,
    pub initial_amount: Decimal,
    pub final_amount: Option<Decimal>,
    pub expected_cash_balance: Option<Decimal>,
    pub cash_difference: Option<Decimal>,
    pub status: String,
}

impl RegisterRow {
    pub fn into_domain(
        self,
        movements: Vec<CashMovement>,
    ) -> Result<CashRegister, DatabaseError> {
        let currency = parse_currency(&self.currency)?;
        let mut register = CashRegister::from_parts(
            CashRegisterId::from_uuid(self.id),
            BranchId::from_uuid(self.branch_id),
            UserId::from_uuid(self.user_id),
            self.opened_at,
            Money::new(self.initial_amount, currency),
            RegisterStatus::from_str(&self.status).map_err(|e| corrupt("register", e))?,
            movements,
        );
        register.closed_at = self.closed_at;
        register.final_amount = self.final_amount.map(|v| Money::new(v, currency));
        register.expected_cash_balance = self
            .expected_cash_balance
            .map(|v| Money::new(v, currency));
        register.cash_difference = self.cash_difference.map(|v| Money::new(v, currency));
        Ok(register)
    }
}

#[derive(Debug, FromRow)]
pub struct CashMovementRow {
    pub id: Uuid,
    pub register_id: Uuid,
    pub movement_type_id: Uuid,
    pub kind: String,
    pub direction: String,
    pub is_system: bool,
    pub payment_method_id: Option<Uuid>,
    pub currency: String,
    pub amount: Decimal,
    pub affects_balance: bool,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl CashMovementRow {
    pub fn into_domain(self) -> Result<CashMovement, DatabaseError> {
        let currency = parse_currency(&self.currency)?;
        Ok(CashMovement {
            id: CashMovementId::from_uuid(self.id),
            register_id: CashRegisterId::from_uuid(self.register_id),
            movement_type_id: MovementTypeId::from_uuid(self.movement_type_id),
            kind: MovementKind::from_str(&self.kind).map_err(|e| corrupt("cash movement", e))?,
            direction: MovementDirection::from_str(&self.direction)
                .map_err(|e| corrupt("cash movement", e))?,
            is_system: self.is_system,
            payment_method_id: self.payment_method_id.map(PaymentMethodId::from_uuid),
            amount: Money::new(self.amount, currency),
            affects_balance: self.affects_balance,
            reference_type: self.reference_type,
            reference_id: self.reference_id,
            user_id: UserId::from_uuid(self.user_id),
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct SaleRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub currency: String,
    pub total: Decimal,
    pub paid_amount: Decimal,
    pub payment_status: String,
    pub surcharge_total: Option<Decimal>,
}

impl SaleRow {
    pub fn into_domain(self) -> Result<Sale, DatabaseError> {
        let currency = parse_currency(&self.currency)?;
        Ok(Sale::from_parts(
            SaleId::from_uuid(self.id),
            Money::new(self.total, currency),
            Money::new(self.paid_amount, currency),
            SalePaymentStatus::from_str(&self.payment_status)
                .map_err(|e| corrupt("sale", e))?,
            self.surcharge_total.map(|v| Money::new(v, currency)),
        ))
    }
}

#[derive(Debug, FromRow)]
pub struct ChargeRow {
    pub id: Uuid,
    pub account_id: Uuid,
    pub kind: String,
    pub currency: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
}

impl ChargeRow {
    pub fn into_domain(self) -> Result<AdministrativeCharge, DatabaseError> {
        let currency = parse_currency(&self.currency)?;
        Ok(AdministrativeCharge::from_parts(
            ChargeId::from_uuid(self.id),
            CurrentAccountId::from_uuid(self.account_id),
            ChargeKind::from_str(&self.kind).map_err(|e| corrupt("charge", e))?,
            Money::new(self.total_amount, currency),
            Money::new(self.paid_amount, currency),
        ))
    }
}
