//! Payment DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{
    BranchId, ChargeId, Currency, Money, PaymentMethodId, SaleId, UserId,
};
use domain_payments::{PaymentOutcome, PaymentRequest, PaymentTarget, TargetResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct SalePaymentDto {
    pub sale_id: Uuid,
    /// Omit to pay the sale's entire pending balance
    pub amount: Option<Decimal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChargePaymentDto {
    pub charge_id: Uuid,
    pub amount: Decimal,
}

/// One payment allocated across sales and charges of an account
#[derive(Debug, Deserialize, Validate)]
pub struct ExecutePaymentRequest {
    pub account_id: Uuid,
    /// Required when `payment_method_id` is present
    pub register_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub favor_credit_amount: Option<Decimal>,
    pub branch_id: Option<Uuid>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub sales: Vec<SalePaymentDto>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub charges: Vec<ChargePaymentDto>,
}

impl ExecutePaymentRequest {
    /// Resolves the wire request into the domain request
    ///
    /// Amounts are interpreted in the account's currency, which the handler
    /// looks up before conversion.
    pub fn into_domain(self, acting_user_id: UserId, currency: Currency) -> PaymentRequest {
        let mut request = PaymentRequest::new(acting_user_id);

        if let Some(id) = self.payment_method_id {
            request = request.with_method(PaymentMethodId::from_uuid(id));
        }
        if let Some(amount) = self.favor_credit_amount {
            request = request.with_favor_credit(Money::new(amount, currency));
        }
        if let Some(branch) = self.branch_id {
            request = request.at_branch(BranchId::from_uuid(branch));
        }

        for sale in self.sales {
            let sale_id = SaleId::from_uuid(sale.sale_id);
            request = match sale.amount {
                Some(amount) => request.pay_sale(sale_id, Money::new(amount, currency)),
                None => request.pay_sale_in_full(sale_id),
            };
        }
        for charge in self.charges {
            request = request.pay_charge(
                ChargeId::from_uuid(charge.charge_id),
                Money::new(charge.amount, currency),
            );
        }

        request
    }
}

#[derive(Debug, Serialize)]
pub struct TargetResultDto {
    pub target_type: String,
    pub target_id: String,
    pub committed: Decimal,
    pub remaining_pending: Decimal,
}

impl From<&TargetResult> for TargetResultDto {
    fn from(result: &TargetResult) -> Self {
        let (target_type, target_id) = match result.target {
            PaymentTarget::Sale(id) => ("sale", id.to_string()),
            PaymentTarget::Charge(id) => ("charge", id.to_string()),
        };
        Self {
            target_type: target_type.to_string(),
            target_id,
            committed: result.committed.amount(),
            remaining_pending: result.remaining_pending.amount(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentOutcomeResponse {
    pub movement_ids: Vec<String>,
    pub cash_movement_id: Option<String>,
    pub targets: Vec<TargetResultDto>,
    pub currency: String,
    pub total_committed: Decimal,
    pub favor_credit_used: Decimal,
    pub cash_amount: Decimal,
    pub is_partial_payment: bool,
    pub remaining_pending: Decimal,
}

impl From<&PaymentOutcome> for PaymentOutcomeResponse {
    fn from(outcome: &PaymentOutcome) -> Self {
        Self {
            movement_ids: outcome.movement_ids.iter().map(|id| id.to_string()).collect(),
            cash_movement_id: outcome.cash_movement_id.map(|id| id.to_string()),
            targets: outcome.targets.iter().map(TargetResultDto::from).collect(),
            currency: outcome.total_committed.currency().code().to_string(),
            total_committed: outcome.total_committed.amount(),
            favor_credit_used: outcome.favor_credit_used.amount(),
            cash_amount: outcome.cash_amount.amount(),
            is_partial_payment: outcome.is_partial_payment,
            remaining_pending: outcome.remaining_pending.amount(),
        }
    }
}
