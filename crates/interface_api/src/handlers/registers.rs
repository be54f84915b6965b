//! Cash register handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{BranchId, CashRegisterId, Money};
use domain_ledger::CashRegister;

use crate::dto::ledger::*;
use crate::error::ApiError;
use crate::handlers::resolve_currency;
use crate::middleware::ActingUser;
use crate::AppState;

/// Opens a register for the acting user at a branch
pub async fn open_register(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Json(request): Json<OpenRegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    request.validate()?;
    let currency = resolve_currency(
        request.currency.as_deref(),
        &state.config.default_currency,
    )?;

    let register = CashRegister::open(
        BranchId::from_uuid(request.branch_id),
        user_id,
        Money::new(request.initial_amount, currency),
        &state.types,
    )?;
    state.registers.insert(&register).await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse::from(&register))))
}

/// Gets a register
pub async fn get_register(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let register = state.registers.get(CashRegisterId::from_uuid(id)).await?;
    Ok(Json(RegisterResponse::from(&register)))
}

/// Reconciles a register against its movement history
pub async fn get_register_totals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RegisterTotalsResponse>, ApiError> {
    let register = state.registers.get(CashRegisterId::from_uuid(id)).await?;
    let totals = register.recalculate(&state.methods);
    Ok(Json(RegisterTotalsResponse::from(&totals)))
}

/// Closes a register, optionally reconciling against a counted amount
pub async fn close_register(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CloseRegisterRequest>,
) -> Result<Json<RegisterTotalsResponse>, ApiError> {
    let register_id = CashRegisterId::from_uuid(id);
    let register = state.registers.get(register_id).await?;
    let final_amount = request
        .final_amount
        .map(|amount| Money::new(amount, register.currency()));

    let totals = state
        .payments
        .close_register(register_id, final_amount)
        .await?;
    Ok(Json(RegisterTotalsResponse::from(&totals)))
}
