//! Payment handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use core_kernel::{CashRegisterId, CurrentAccountId};

use crate::dto::payments::*;
use crate::error::ApiError;
use crate::middleware::ActingUser;
use crate::AppState;

/// Allocates one payment across the selected sales and charges
///
/// The whole allocation commits atomically: either every selected target is
/// settled as requested, or nothing is written.
pub async fn execute_payment(
    State(state): State<AppState>,
    ActingUser(user_id): ActingUser,
    Json(request): Json<ExecutePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentOutcomeResponse>), ApiError> {
    request.validate()?;

    let account_id = CurrentAccountId::from_uuid(request.account_id);
    let register_id = request.register_id.map(CashRegisterId::from_uuid);

    // The account's currency governs how the wire amounts are interpreted
    let account = state.accounts.get(account_id).await?;
    let eligible_branches = state.registers.open_branches(user_id).await?;

    let domain_request = request.into_domain(user_id, account.currency());
    let outcome = state
        .payments
        .execute_payment(account_id, register_id, &domain_request, &eligible_branches)
        .await?;

    Ok((StatusCode::CREATED, Json(PaymentOutcomeResponse::from(&outcome))))
}
