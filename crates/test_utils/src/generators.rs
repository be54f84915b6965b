//! Property-Based Test Generators
//!
//! Proptest strategies for generating random test data that maintains
//! domain invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::ARS),
        Just(Currency::BRL),
        Just(Currency::CLP),
        Just(Currency::COP),
        Just(Currency::MXN),
        Just(Currency::PEN),
        Just(Currency::PYG),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::UYU),
    ]
}

/// Strategy for generating positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating signed amounts in minor units
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    -1_000_000_000i64..1_000_000_000i64
}

/// Strategy for generating positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating Money values of either sign
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating positive Money values in one fixed currency
pub fn positive_money_in(currency: Currency) -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(move |amount| Money::from_minor(amount, currency))
}

/// Strategy for a non-empty list of pending balances in one currency
///
/// Shaped like the inputs of the proportional allocator: every entry is
/// positive and shares the account's currency.
pub fn pending_amounts_strategy(currency: Currency) -> impl Strategy<Value = Vec<Money>> {
    proptest::collection::vec(1i64..10_000_00i64, 1..8).prop_map(move |amounts| {
        amounts
            .into_iter()
            .map(|minor| Money::from_minor(minor, currency))
            .collect()
    })
}

/// Strategy for generating rate-like Decimal values (0.0 to 1.0)
pub fn rate_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..10000u32).prop_map(|n| Decimal::new(n as i64, 4))
}
