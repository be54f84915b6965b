//! Account, register and charge DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use domain_ledger::{CashRegister, CurrentAccount, CurrentAccountMovement, RegisterTotals};
use domain_payments::{AdministrativeCharge, Sale};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAccountRequest {
    pub customer_id: Uuid,
    /// ISO 4217 code; the server default applies when absent
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
    /// Omit for unlimited credit
    pub credit_limit: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub customer_id: String,
    pub currency: String,
    pub credit_limit: Option<Decimal>,
    pub current_balance: Decimal,
    pub available_favor_credit: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&CurrentAccount> for AccountResponse {
    fn from(account: &CurrentAccount) -> Self {
        Self {
            id: account.id.to_string(),
            customer_id: account.customer_id.to_string(),
            currency: account.currency().code().to_string(),
            credit_limit: account.credit_limit.map(|m| m.amount()),
            current_balance: account.current_balance().amount(),
            available_favor_credit: account.available_favor_credit().amount(),
            status: account.status.as_str().to_string(),
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub id: String,
    pub kind: String,
    pub direction: String,
    pub amount: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub sale_id: Option<String>,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&CurrentAccountMovement> for MovementResponse {
    fn from(movement: &CurrentAccountMovement) -> Self {
        Self {
            id: movement.id.to_string(),
            kind: movement.kind.as_str().to_string(),
            direction: movement.direction.as_str().to_string(),
            amount: movement.amount.amount(),
            balance_before: movement.balance_before.amount(),
            balance_after: movement.balance_after.amount(),
            sale_id: movement.sale_id.map(|id| id.to_string()),
            reference: movement.reference.clone(),
            created_at: movement.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FavorCreditResponse {
    pub account_id: String,
    pub currency: String,
    pub available_favor_credit: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PendingSaleResponse {
    pub id: String,
    pub currency: String,
    pub total: Decimal,
    pub surcharge_total: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub payment_status: String,
}

impl PendingSaleResponse {
    /// Builds the response using the sale's movement history for surcharges
    pub fn from_sale(sale: &Sale, movements: &[CurrentAccountMovement]) -> Self {
        let surcharge = sale.surcharge_total(movements);
        Self {
            id: sale.id.to_string(),
            currency: sale.currency().code().to_string(),
            total: sale.total.amount(),
            surcharge_total: surcharge.amount(),
            paid_amount: sale.paid_amount().amount(),
            pending_amount: sale.pending_amount(surcharge).amount(),
            payment_status: sale.payment_status().as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAccountStatusRequest {
    /// "active", "suspended" or "closed"
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    /// Sale identifier issued by the sales system; generated when absent
    pub id: Option<Uuid>,
    pub total: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChargeRequest {
    /// "interest" or "debit_adjustment"
    #[validate(length(min = 1))]
    pub kind: String,
    pub amount: Decimal,
    /// Free-form reference (invoice number, statement period)
    pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChargeResponse {
    pub id: String,
    pub account_id: String,
    pub kind: String,
    pub currency: String,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub pending_amount: Decimal,
    pub is_settled: bool,
}

impl From<&AdministrativeCharge> for ChargeResponse {
    fn from(charge: &AdministrativeCharge) -> Self {
        Self {
            id: charge.id.to_string(),
            account_id: charge.account_id.to_string(),
            kind: charge.kind.as_str().to_string(),
            currency: charge.total_amount().currency().code().to_string(),
            total_amount: charge.total_amount().amount(),
            paid_amount: charge.paid_amount().amount(),
            pending_amount: charge.pending_amount().amount(),
            is_settled: charge.is_settled(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct OpenRegisterRequest {
    pub branch_id: Uuid,
    pub initial_amount: Decimal,
    /// ISO 4217 code; the server default applies when absent
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub branch_id: String,
    pub user_id: String,
    pub currency: String,
    pub status: String,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub initial_amount: Decimal,
    pub final_amount: Option<Decimal>,
    pub expected_cash_balance: Option<Decimal>,
    pub cash_difference: Option<Decimal>,
}

impl From<&CashRegister> for RegisterResponse {
    fn from(register: &CashRegister) -> Self {
        Self {
            id: register.id.to_string(),
            branch_id: register.branch_id.to_string(),
            user_id: register.user_id.to_string(),
            currency: register.currency().code().to_string(),
            status: register.status.as_str().to_string(),
            opened_at: register.opened_at,
            closed_at: register.closed_at,
            initial_amount: register.initial_amount.amount(),
            final_amount: register.final_amount.map(|m| m.amount()),
            expected_cash_balance: register.expected_cash_balance.map(|m| m.amount()),
            cash_difference: register.cash_difference.map(|m| m.amount()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CloseRegisterRequest {
    /// Counted drawer amount; omit to close blind
    pub final_amount: Option<Decimal>,
}

#[derive(Debug, Serialize)]
pub struct RegisterTotalsResponse {
    pub expected_cash_balance: Decimal,
    pub payment_method_totals: BTreeMap<String, Decimal>,
    pub cash_difference: Option<Decimal>,
}

impl From<&RegisterTotals> for RegisterTotalsResponse {
    fn from(totals: &RegisterTotals) -> Self {
        Self {
            expected_cash_balance: totals.expected_cash_balance.amount(),
            payment_method_totals: totals
                .payment_method_totals
                .iter()
                .map(|(name, money)| (name.clone(), money.amount()))
                .collect(),
            cash_difference: totals.cash_difference.map(|m| m.amount()),
        }
    }
}
