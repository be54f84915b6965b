//! Current account handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use core_kernel::{CurrentAccountId, CustomerId, Money, SaleId};
use domain_ledger::AccountStatus;
use domain_payments::{ChargeKind, Sale};

use crate::dto::ledger::*;
use crate::error::ApiError;
use crate::handlers::resolve_currency;
use crate::AppState;

/// Opens a current account for a customer
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), ApiError> {
    request.validate()?;
    let currency = resolve_currency(
        request.currency.as_deref(),
        &state.config.default_currency,
    )?;

    let mut account =
        domain_ledger::CurrentAccount::new(CustomerId::from_uuid(request.customer_id), currency);
    if let Some(limit) = request.credit_limit {
        let limit = Money::new(limit, currency);
        if limit.is_negative() {
            return Err(ApiError::BadRequest(
                "credit limit must be non-negative".to_string(),
            ));
        }
        account = account.with_credit_limit(limit);
    }

    state.accounts.insert(&account).await?;
    Ok((StatusCode::CREATED, Json(AccountResponse::from(&account))))
}

/// Gets an account with its derived balances
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = state.accounts.get(CurrentAccountId::from_uuid(id)).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// Updates the lifecycle status of an account
pub async fn update_account_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAccountStatusRequest>,
) -> Result<Json<AccountResponse>, ApiError> {
    let status = AccountStatus::from_str(&request.status)
        .map_err(|_| ApiError::BadRequest(format!("unknown status '{}'", request.status)))?;

    let id = CurrentAccountId::from_uuid(id);
    state.accounts.set_status(id, status).await?;
    let account = state.accounts.get(id).await?;
    Ok(Json(AccountResponse::from(&account)))
}

/// Lists the movement history of an account, oldest first
pub async fn list_movements(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MovementResponse>>, ApiError> {
    let account = state.accounts.get(CurrentAccountId::from_uuid(id)).await?;
    let movements = account
        .movements()
        .iter()
        .map(MovementResponse::from)
        .collect();
    Ok(Json(movements))
}

/// Reports the favor credit usable as a payment instrument
pub async fn get_favor_credit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FavorCreditResponse>, ApiError> {
    let account = state.accounts.get(CurrentAccountId::from_uuid(id)).await?;
    Ok(Json(FavorCreditResponse {
        account_id: account.id.to_string(),
        currency: account.currency().code().to_string(),
        available_favor_credit: account.available_favor_credit().amount(),
    }))
}

/// Records a sale against an account
pub async fn create_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<PendingSaleResponse>), ApiError> {
    let account_id = CurrentAccountId::from_uuid(id);
    let account = state.accounts.get(account_id).await?;

    let total = Money::new(request.total, account.currency());
    if !total.is_positive() {
        return Err(ApiError::BadRequest(
            "sale total must be positive".to_string(),
        ));
    }

    let sale_id = match request.id {
        Some(id) => SaleId::from_uuid(id),
        None => SaleId::new_v7(),
    };
    let sale = Sale::new(sale_id, total);
    state.sales.insert_sale(account_id, &sale).await?;

    Ok((
        StatusCode::CREATED,
        Json(PendingSaleResponse::from_sale(&sale, account.movements())),
    ))
}

/// Lists the sales of an account that still owe money
pub async fn list_pending_sales(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PendingSaleResponse>>, ApiError> {
    let account_id = CurrentAccountId::from_uuid(id);
    let sales = state.sales.pending_sales(account_id).await?;
    let movements = state.accounts.movements(account_id).await?;

    let responses = sales
        .iter()
        .map(|sale| PendingSaleResponse::from_sale(sale, &movements))
        .collect();
    Ok(Json(responses))
}

/// Lists the open administrative charges of an account
pub async fn list_open_charges(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChargeResponse>>, ApiError> {
    let charges = state
        .sales
        .open_charges(CurrentAccountId::from_uuid(id))
        .await?;
    Ok(Json(charges.iter().map(ChargeResponse::from).collect()))
}

/// Posts an interest or debit adjustment and opens the payable charge
pub async fn create_charge(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateChargeRequest>,
) -> Result<(StatusCode, Json<ChargeResponse>), ApiError> {
    request.validate()?;
    let kind = ChargeKind::from_str(&request.kind)
        .map_err(|_| ApiError::BadRequest(format!("unknown charge kind '{}'", request.kind)))?;

    let account_id = CurrentAccountId::from_uuid(id);
    let account = state.accounts.get(account_id).await?;
    let amount = Money::new(request.amount, account.currency());
    if !amount.is_positive() {
        return Err(ApiError::BadRequest(
            "charge amount must be positive".to_string(),
        ));
    }

    let charge = state
        .payments
        .record_charge(account_id, kind, amount, request.reference)
        .await?;
    Ok((StatusCode::CREATED, Json(ChargeResponse::from(&charge))))
}
