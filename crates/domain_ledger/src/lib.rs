//! Ledger Domain - Current Accounts and Cash Registers
//!
//! This crate implements the two running-balance books of the retail
//! back-office:
//!
//! - **Current accounts** track what each customer owes (or holds in their
//!   favor), appending immutable movements that capture balance-before and
//!   balance-after.
//! - **Cash registers** track a till's drawer, deriving per-payment-method
//!   totals and the expected cash balance from the same movement history.
//!
//! Both books consume the shared movement-type catalog: a closed set of
//! kinds, each tagged with a direction and with flags for which book it
//! participates in.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{CurrentAccount, MovementDetail, MovementKind, MovementTypeRegistry};
//!
//! let types = MovementTypeRegistry::standard();
//! let sale = types.by_kind(MovementKind::Sale)?;
//!
//! account.apply_movement(sale, amount, MovementDetail::new().for_sale(sale_id))?;
//! ```

pub mod cash_register;
pub mod current_account;
pub mod error;
pub mod movement_type;
pub mod payment_method;

pub use cash_register::{CashMovement, CashRegister, RegisterStatus, RegisterTotals};
pub use current_account::{
    AccountStatus, CurrentAccount, CurrentAccountMovement, MovementDetail,
};
pub use error::LedgerError;
pub use movement_type::{MovementDirection, MovementKind, MovementType, MovementTypeRegistry};
pub use payment_method::{
    PaymentMethod, PaymentMethodCatalog, PaymentMethodKind, UNDEFINED_METHOD,
};
