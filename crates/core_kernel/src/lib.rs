//! Core Kernel - Foundational types and utilities for the retail back-office
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers and value objects
//! - Common error types

pub mod error;
pub mod identifiers;
pub mod money;

pub use error::CoreError;
pub use identifiers::{
    BranchId, CashMovementId, CashRegisterId, ChargeId, CurrentAccountId, CustomerId, MovementId,
    MovementTypeId, PaymentMethodId, SaleId, UserId,
};
pub use money::{Currency, Money, MoneyError};
