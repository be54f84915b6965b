//! HTTP request handlers

pub mod accounts;
pub mod health;
pub mod payments;
pub mod registers;

use std::str::FromStr;

use core_kernel::Currency;

use crate::error::ApiError;

/// Resolves an optional ISO 4217 code, falling back to the server default
pub(crate) fn resolve_currency(
    requested: Option<&str>,
    default: &str,
) -> Result<Currency, ApiError> {
    let code = requested.unwrap_or(default);
    Currency::from_str(code)
        .map_err(|_| ApiError::BadRequest(format!("unknown currency '{code}'")))
}
