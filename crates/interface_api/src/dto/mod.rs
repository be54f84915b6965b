//! Data transfer objects
//!
//! Wire-format types for the HTTP API. Amounts travel as plain decimals;
//! the handler resolves them into `Money` in the account's currency.

pub mod ledger;
pub mod payments;

pub use ledger::*;
pub use payments::*;
