//! Ledger domain errors

use core_kernel::{CashRegisterId, CurrentAccountId, MoneyError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Money arithmetic failure (currency mismatch, overflow)
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Mutating movement against a closed account
    #[error("Current account is closed: {0}")]
    AccountClosed(CurrentAccountId),

    /// Mutating movement against a suspended account
    #[error("Current account is suspended: {0}")]
    AccountSuspended(CurrentAccountId),

    /// Write against a closed cash register
    #[error("Cash register is closed: {0}")]
    RegisterClosed(CashRegisterId),

    /// Debt-increasing movement would exceed the credit limit
    #[error("Insufficient credit: requested {requested}, available {available}")]
    InsufficientCredit {
        requested: Decimal,
        available: Decimal,
    },

    /// Movement amount is negative or otherwise unusable
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Movement type is inactive or targets the wrong ledger
    #[error("Invalid movement type: {0}")]
    InvalidMovementType(String),

    /// Movement type not present in the catalog
    #[error("Unknown movement type: {0}")]
    UnknownMovementType(String),

    /// Movement kind registered twice
    #[error("Duplicate movement type: {0}")]
    DuplicateMovementType(String),

    /// Stored value does not parse back into a known state
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Replay of the movement history found a gap or overlap
    #[error("Balance chain violation: {0}")]
    BalanceChainViolation(String),
}
