//! Payment allocation engine
//!
//! Takes one payment request against one current account and settles it
//! atomically across the selected sales and charges: every validation runs
//! before the first write, and a single request produces at most one cash
//! movement regardless of how many targets it touches.
//!
//! Funding works in two layers. The settled portion of each sale is booked as
//! an outflow movement, and the portion funded by the payment instrument comes
//! back as an inflow movement; for a method-funded payment the pair nets to
//! zero, while the favor-credit-funded portion posts no inflow and so debits
//! the account's negative balance back toward zero. When favor credit is the
//! only instrument, each sale's commitment is clamped to its proportional
//! credit share, so nothing is ever booked without funding behind it. Charges
//! already sit on the account as debt, so their payments post only the inflow.

use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::{
    BranchId, CashMovementId, ChargeId, Money, MovementId, PaymentMethodId, SaleId, UserId,
};
use domain_ledger::{
    AccountStatus, CashRegister, CurrentAccount, LedgerError, MovementDetail, MovementKind,
    MovementTypeRegistry, PaymentMethodCatalog, RegisterStatus,
};

use crate::allocation::distribute_proportionally;
use crate::charge::AdministrativeCharge;
use crate::error::PaymentError;
use crate::sale::Sale;

/// One sale selected for payment; `amount` defaults to the full pending balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalePaymentInput {
    pub sale_id: SaleId,
    pub amount: Option<Money>,
}

/// One charge selected for payment; charges are always paid an explicit amount
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargePaymentInput {
    pub charge_id: ChargeId,
    pub amount: Money,
}

/// A payment to allocate across sales and charges of one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_method: Option<PaymentMethodId>,
    pub favor_credit_amount: Option<Money>,
    pub branch_id: Option<BranchId>,
    pub acting_user_id: UserId,
    pub sale_payments: Vec<SalePaymentInput>,
    pub charge_payments: Vec<ChargePaymentInput>,
}

impl PaymentRequest {
    pub fn new(acting_user_id: UserId) -> Self {
        Self {
            payment_method: None,
            favor_credit_amount: None,
            branch_id: None,
            acting_user_id,
            sale_payments: Vec::new(),
            charge_payments: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: PaymentMethodId) -> Self {
        self.payment_method = Some(method);
        self
    }

    pub fn with_favor_credit(mut self, amount: Money) -> Self {
        self.favor_credit_amount = Some(amount);
        self
    }

    pub fn at_branch(mut self, branch: BranchId) -> Self {
        self.branch_id = Some(branch);
        self
    }

    /// Pays an explicit amount toward a sale
    pub fn pay_sale(mut self, sale_id: SaleId, amount: Money) -> Self {
        self.sale_payments.push(SalePaymentInput {
            sale_id,
            amount: Some(amount),
        });
        self
    }

    /// Pays a sale's entire pending balance
    pub fn pay_sale_in_full(mut self, sale_id: SaleId) -> Self {
        self.sale_payments.push(SalePaymentInput {
            sale_id,
            amount: None,
        });
        self
    }

    pub fn pay_charge(mut self, charge_id: ChargeId, amount: Money) -> Self {
        self.charge_payments.push(ChargePaymentInput { charge_id, amount });
        self
    }
}

/// Everything a payment can read or write, loaded and locked by the caller
#[derive(Debug)]
pub struct PaymentContext<'a> {
    pub account: &'a mut CurrentAccount,
    pub register: Option<&'a mut CashRegister>,
    pub sales: &'a mut [Sale],
    pub charges: &'a mut [AdministrativeCharge],
    /// Branches the acting user may record charge payments at
    pub eligible_branches: &'a [BranchId],
}

/// What a single target ended up with
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetResult {
    pub target: PaymentTarget,
    pub committed: Money,
    pub remaining_pending: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum PaymentTarget {
    Sale(SaleId),
    Charge(ChargeId),
}

/// Result of a committed payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub movement_ids: Vec<MovementId>,
    pub cash_movement_id: Option<CashMovementId>,
    pub targets: Vec<TargetResult>,
    pub total_committed: Money,
    pub favor_credit_used: Money,
    pub cash_amount: Money,
    /// True when the selected targets were not settled in full
    pub is_partial_payment: bool,
    /// Pending balance left across the selected targets
    pub remaining_pending: Money,
}

struct SalePlan {
    idx: usize,
    sale_id: SaleId,
    requested: Money,
    pending_before: Money,
    surcharge: Money,
}

struct ChargePlan {
    idx: usize,
    charge_id: ChargeId,
    requested: Money,
    pending_before: Money,
}

/// Stateless allocator over the shared catalogs
pub struct PaymentProcessor<'a> {
    types: &'a MovementTypeRegistry,
    methods: &'a PaymentMethodCatalog,
}

impl<'a> PaymentProcessor<'a> {
    pub fn new(types: &'a MovementTypeRegistry, methods: &'a PaymentMethodCatalog) -> Self {
        Self { types, methods }
    }

    /// Validates and commits one payment request
    ///
    /// All validations complete before the first movement is written; the
    /// caller wraps the whole call in a database transaction so a late ledger
    /// failure rolls the earlier writes back.
    pub fn process(
        &self,
        request: &PaymentRequest,
        ctx: &mut PaymentContext<'_>,
    ) -> Result<PaymentOutcome, PaymentError> {
        let currency = ctx.account.currency();
        let zero = Money::zero(currency);

        if request.sale_payments.is_empty() && request.charge_payments.is_empty() {
            return Err(PaymentError::EmptySelection);
        }

        match ctx.account.status {
            AccountStatus::Active => {}
            AccountStatus::Suspended => {
                return Err(LedgerError::AccountSuspended(ctx.account.id).into())
            }
            AccountStatus::Closed => {
                return Err(LedgerError::AccountClosed(ctx.account.id).into())
            }
        }

        let method = match request.payment_method {
            Some(id) => {
                let method = self
                    .methods
                    .get(id)
                    .ok_or(PaymentError::UnknownPaymentMethod(id))?;
                if !method.is_active {
                    return Err(PaymentError::InactivePaymentMethod(method.name.clone()));
                }
                Some(method)
            }
            None => None,
        };

        let favor_credit = request.favor_credit_amount.unwrap_or(zero);
        if favor_credit.is_negative() {
            return Err(PaymentError::InvalidAmount(format!(
                "favor credit must be non-negative, got {}",
                favor_credit.amount()
            )));
        }
        if method.is_none() && !favor_credit.is_positive() {
            return Err(PaymentError::MissingInstrument);
        }
        if favor_credit.is_positive() {
            let available = ctx.account.available_favor_credit();
            if favor_credit.amount() > available.amount() {
                return Err(PaymentError::InsufficientFavorCredit {
                    requested: favor_credit.amount(),
                    available: available.amount(),
                });
            }
        }

        if let Some(method) = method {
            match ctx.register.as_deref() {
                None => return Err(PaymentError::MissingRegister(method.id)),
                Some(register) if register.status == RegisterStatus::Closed => {
                    return Err(LedgerError::RegisterClosed(register.id).into())
                }
                Some(_) => {}
            }
        }

        let mut sale_plans = self.plan_sales(request, ctx)?;
        let charge_plans = self.plan_charges(request, ctx)?;

        if !charge_plans.is_empty()
            && request.branch_id.is_none()
            && ctx.eligible_branches.len() > 1
        {
            return Err(PaymentError::MissingBranch);
        }

        let mut sale_total = zero;
        for plan in &sale_plans {
            sale_total = sale_total.checked_add(&plan.requested)?;
        }
        let mut charge_total = zero;
        for plan in &charge_plans {
            charge_total = charge_total.checked_add(&plan.requested)?;
        }

        // Favor credit can only fund sale targets: charge debt already sits
        // on the account, and offsetting it with the account's own negative
        // balance would double-count.
        if favor_credit.amount() > sale_total.amount() {
            return Err(PaymentError::FavorCreditExceedsRequested {
                credit: favor_credit.amount(),
                requested: sale_total.amount(),
            });
        }

        // Charges are settled by the instrument alone, so selecting one
        // without a payment method would leave its inflow unfunded.
        if method.is_none() && !charge_plans.is_empty() {
            return Err(PaymentError::MissingInstrument);
        }

        // With no payment method the favor credit is the only funding, so
        // each sale's commitment is clamped to its proportional credit
        // share: the request settles what the credit covers and the rest
        // stays pending.
        if method.is_none() && favor_credit.amount() < sale_total.amount() {
            let requested: Vec<Money> = sale_plans.iter().map(|p| p.requested).collect();
            let clamped = distribute_proportionally(favor_credit, &requested)?;
            for (plan, share) in sale_plans.iter_mut().zip(clamped) {
                plan.requested = share;
            }
            sale_total = favor_credit;
        }

        let credit_shares = if favor_credit.is_positive() {
            let pendings: Vec<Money> = sale_plans.iter().map(|p| p.requested).collect();
            distribute_proportionally(favor_credit, &pendings)?
        } else {
            vec![zero; sale_plans.len()]
        };

        // Validation done; from here on every write must succeed or the
        // caller's transaction rolls back.
        let sale_type = self.types.by_kind(MovementKind::Sale)?;
        let payment_type = self.types.by_kind(MovementKind::Payment)?;

        let mut movement_ids = Vec::new();
        let mut favor_credit_used = zero;

        for (plan, credit_share) in sale_plans.iter().zip(&credit_shares) {
            // A clamped share can round to zero; such a sale gets no
            // movements this time around.
            if !plan.requested.is_positive() {
                continue;
            }
            // Booking the settled portion is a settlement, not a credit
            // extension, so it bypasses the limit check.
            let settle = ctx.account.apply_movement(
                sale_type,
                plan.requested,
                MovementDetail::new()
                    .for_sale(plan.sale_id)
                    .authorize_over_limit(),
            )?;
            movement_ids.push(settle.id);

            let funded = plan.requested.checked_sub(credit_share)?;
            if funded.is_positive() {
                let inflow = ctx.account.apply_movement(
                    payment_type,
                    funded,
                    MovementDetail::new().for_sale(plan.sale_id),
                )?;
                movement_ids.push(inflow.id);
            }
            favor_credit_used = favor_credit_used.checked_add(credit_share)?;

            ctx.sales[plan.idx].record_payment(plan.requested, plan.surcharge)?;
        }

        for plan in &charge_plans {
            let inflow = ctx.account.apply_movement(
                payment_type,
                plan.requested,
                MovementDetail::new().with_reference(plan.charge_id.to_string()),
            )?;
            movement_ids.push(inflow.id);

            ctx.charges[plan.idx].record_payment(plan.requested)?;
        }

        let total_committed = sale_total.checked_add(&charge_total)?;
        let cash_amount = total_committed.checked_sub(&favor_credit_used)?;

        let mut cash_movement_id = None;
        if let Some(method) = method {
            if cash_amount.is_positive() {
                let register = ctx
                    .register
                    .as_deref_mut()
                    .ok_or(PaymentError::MissingRegister(method.id))?;
                let cash = register.record_movement(
                    payment_type,
                    cash_amount,
                    Some(method),
                    true,
                    request.acting_user_id,
                    Some(("current_account".to_string(), *ctx.account.id.as_uuid())),
                )?;
                cash_movement_id = Some(cash.id);
            }
        }

        let mut targets = Vec::with_capacity(sale_plans.len() + charge_plans.len());
        let mut total_pending_before = zero;
        let mut remaining_pending = zero;

        for plan in &sale_plans {
            let remaining = ctx.sales[plan.idx].pending_amount(plan.surcharge);
            total_pending_before = total_pending_before.checked_add(&plan.pending_before)?;
            remaining_pending = remaining_pending.checked_add(&remaining)?;
            targets.push(TargetResult {
                target: PaymentTarget::Sale(plan.sale_id),
                committed: plan.requested,
                remaining_pending: remaining,
            });
        }
        for plan in &charge_plans {
            let remaining = ctx.charges[plan.idx].pending_amount();
            total_pending_before = total_pending_before.checked_add(&plan.pending_before)?;
            remaining_pending = remaining_pending.checked_add(&remaining)?;
            targets.push(TargetResult {
                target: PaymentTarget::Charge(plan.charge_id),
                committed: plan.requested,
                remaining_pending: remaining,
            });
        }

        let outcome = PaymentOutcome {
            movement_ids,
            cash_movement_id,
            targets,
            total_committed,
            favor_credit_used,
            cash_amount,
            is_partial_payment: total_committed.amount() < total_pending_before.amount(),
            remaining_pending,
        };

        info!(
            account = %ctx.account.id,
            committed = %outcome.total_committed.amount(),
            cash = %outcome.cash_amount.amount(),
            favor_credit = %outcome.favor_credit_used.amount(),
            partial = outcome.is_partial_payment,
            "payment allocated"
        );

        Ok(outcome)
    }

    fn plan_sales(
        &self,
        request: &PaymentRequest,
        ctx: &PaymentContext<'_>,
    ) -> Result<Vec<SalePlan>, PaymentError> {
        let mut plans = Vec::with_capacity(request.sale_payments.len());
        let mut seen = std::collections::HashSet::new();

        for input in &request.sale_payments {
            if !seen.insert(input.sale_id) {
                return Err(PaymentError::InvalidAmount(format!(
                    "sale {} selected more than once",
                    input.sale_id
                )));
            }

            let idx = ctx
                .sales
                .iter()
                .position(|s| s.id == input.sale_id)
                .ok_or(PaymentError::UnknownSale(input.sale_id))?;
            let sale = &ctx.sales[idx];

            let surcharge = sale.surcharge_total(ctx.account.movements());
            let pending = sale.pending_amount(surcharge);
            let requested = input.amount.unwrap_or(pending);

            if !requested.is_positive() {
                return Err(PaymentError::InvalidAmount(format!(
                    "sale {} payment must be positive, got {}",
                    input.sale_id,
                    requested.amount()
                )));
            }
            if requested.amount() > pending.amount() {
                return Err(PaymentError::AmountExceedsPending {
                    target: format!("sale {}", input.sale_id),
                    requested: requested.amount(),
                    pending: pending.amount(),
                });
            }

            plans.push(SalePlan {
                idx,
                sale_id: input.sale_id,
                requested,
                pending_before: pending,
                surcharge,
            });
        }

        Ok(plans)
    }

    fn plan_charges(
        &self,
        request: &PaymentRequest,
        ctx: &PaymentContext<'_>,
    ) -> Result<Vec<ChargePlan>, PaymentError> {
        let mut plans = Vec::with_capacity(request.charge_payments.len());
        let mut seen = std::collections::HashSet::new();

        for input in &request.charge_payments {
            if !seen.insert(input.charge_id) {
                return Err(PaymentError::InvalidAmount(format!(
                    "charge {} selected more than once",
                    input.charge_id
                )));
            }

            let idx = ctx
                .charges
                .iter()
                .position(|c| c.id == input.charge_id)
                .ok_or(PaymentError::UnknownCharge(input.charge_id))?;
            let charge = &ctx.charges[idx];

            let pending = charge.pending_amount();
            if !input.amount.is_positive() {
                return Err(PaymentError::InvalidAmount(format!(
                    "charge {} payment must be positive, got {}",
                    input.charge_id,
                    input.amount.amount()
                )));
            }
            if input.amount.amount() > pending.amount() {
                return Err(PaymentError::AmountExceedsPending {
                    target: format!("charge {}", input.charge_id),
                    requested: input.amount.amount(),
                    pending: pending.amount(),
                });
            }

            plans.push(ChargePlan {
                idx,
                charge_id: input.charge_id,
                requested: input.amount,
                pending_before: pending,
            });
        }

        Ok(plans)
    }
}
