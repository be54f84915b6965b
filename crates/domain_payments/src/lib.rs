//! Payments Domain - Allocation Engine and Payment Tracking
//!
//! This crate settles customer payments against the ledgers in
//! `domain_ledger`:
//!
//! - **Sales** and **administrative charges** expose pending balances and
//!   forward-only payment statuses.
//! - **Proportional allocation** splits a credit across several targets by
//!   their pending balances, with deterministic rounding.
//! - The **payment processor** validates a whole request up front, then
//!   commits account movements, sale/charge progress, and at most one cash
//!   movement per request.
//!
//! Payments can be funded by a catalogued payment method, by the account's
//! favor credit (a negative balance), or both at once.

pub mod allocation;
pub mod charge;
pub mod engine;
pub mod error;
pub mod sale;

pub use allocation::distribute_proportionally;
pub use charge::{AdministrativeCharge, ChargeKind};
pub use engine::{
    ChargePaymentInput, PaymentContext, PaymentOutcome, PaymentProcessor, PaymentRequest,
    PaymentTarget, SalePaymentInput, TargetResult,
};
pub use error::PaymentError;
pub use sale::{Sale, SalePaymentStatus};
