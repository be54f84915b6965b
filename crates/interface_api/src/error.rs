//! API error handling
//!
//! Domain rejections map to 4xx responses with a stable machine-readable
//! error type; storage and unexpected failures collapse to 5xx without
//! leaking internals.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_ledger::LedgerError;
use domain_payments::PaymentError;
use infra_db::{DatabaseError, ServiceError};

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg.clone())
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            ApiError::Database(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg.clone())
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::UnknownSale(_)
            | PaymentError::UnknownCharge(_)
            | PaymentError::UnknownPaymentMethod(_) => ApiError::NotFound(err.to_string()),
            PaymentError::Ledger(e) => e.into(),
            PaymentError::EmptySelection
            | PaymentError::MissingInstrument
            | PaymentError::MissingBranch
            | PaymentError::MissingRegister(_)
            | PaymentError::InactivePaymentMethod(_)
            | PaymentError::InvalidAmount(_)
            | PaymentError::AmountExceedsPending { .. }
            | PaymentError::InsufficientFavorCredit { .. }
            | PaymentError::FavorCreditExceedsRequested { .. } => {
                ApiError::Validation(err.to_string())
            }
            PaymentError::Money(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountClosed(_)
            | LedgerError::AccountSuspended(_)
            | LedgerError::RegisterClosed(_)
            | LedgerError::InsufficientCredit { .. } => ApiError::Conflict(err.to_string()),
            LedgerError::UnknownMovementType(_) => ApiError::NotFound(err.to_string()),
            LedgerError::InvalidAmount(_)
            | LedgerError::InvalidMovementType(_)
            | LedgerError::DuplicateMovementType(_) => ApiError::Validation(err.to_string()),
            LedgerError::Money(_) => ApiError::BadRequest(err.to_string()),
            LedgerError::InvalidStatus(_) | LedgerError::BalanceChainViolation(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else if matches!(err, DatabaseError::ConcurrencyConflict(_)) {
            ApiError::Conflict(err.to_string())
        } else if err.is_constraint_violation() {
            ApiError::Validation(err.to_string())
        } else {
            ApiError::Database(err.to_string())
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Payment(e) => e.into(),
            ServiceError::Ledger(e) => e.into(),
            ServiceError::Database(e) => e.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::CurrentAccountId;

    #[test]
    fn test_domain_rejection_maps_to_422() {
        let api: ApiError = PaymentError::EmptySelection.into();
        assert!(matches!(api, ApiError::Validation(_)));
    }

    #[test]
    fn test_closed_account_maps_to_conflict() {
        let api: ApiError =
            PaymentError::Ledger(LedgerError::AccountClosed(CurrentAccountId::new())).into();
        assert!(matches!(api, ApiError::Conflict(_)));
    }

    #[test]
    fn test_concurrency_conflict_maps_to_conflict() {
        let api: ApiError = DatabaseError::ConcurrencyConflict("deadlock".into()).into();
        assert!(matches!(api, ApiError::Conflict(_)));
    }
}
