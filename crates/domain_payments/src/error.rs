//! Payments domain errors

use core_kernel::{ChargeId, MoneyError, PaymentMethodId, SaleId};
use domain_ledger::LedgerError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while allocating a payment
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Failure raised by one of the ledgers
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Money arithmetic failure
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// The request selects no sales and no charges
    #[error("Payment request selects no targets")]
    EmptySelection,

    /// Neither a payment method nor favor credit was supplied
    #[error("Payment request carries no payment instrument")]
    MissingInstrument,

    /// Charges are included and the branch cannot be inferred
    #[error("Branch is required when paying charges across multiple branches")]
    MissingBranch,

    /// A physical payment method requires an open cash register
    #[error("An open cash register is required for payment method {0}")]
    MissingRegister(PaymentMethodId),

    /// Payment method not present in the catalog
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(PaymentMethodId),

    /// Payment method is retired
    #[error("Inactive payment method: {0}")]
    InactivePaymentMethod(String),

    /// Sale not present in the request context
    #[error("Unknown sale: {0}")]
    UnknownSale(SaleId),

    /// Charge not present in the request context
    #[error("Unknown charge: {0}")]
    UnknownCharge(ChargeId),

    /// An amount is non-positive, duplicated, or otherwise unusable
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A requested allocation exceeds the target's pending balance
    ///
    /// Never silently clamped: upstream rounding is not trusted.
    #[error("Amount exceeds pending balance of {target}: requested {requested}, pending {pending}")]
    AmountExceedsPending {
        target: String,
        requested: Decimal,
        pending: Decimal,
    },

    /// Favor credit requested beyond the account's negative balance
    #[error("Insufficient favor credit: requested {requested}, available {available}")]
    InsufficientFavorCredit {
        requested: Decimal,
        available: Decimal,
    },

    /// Favor credit cannot exceed the amounts it is meant to fund
    #[error("Favor credit {credit} exceeds requested sale amounts {requested}")]
    FavorCreditExceedsRequested { credit: Decimal, requested: Decimal },
}
