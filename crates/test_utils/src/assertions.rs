//! Custom Test Assertions
//!
//! Specialized assertion helpers for domain types that give more meaningful
//! error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_ledger::CurrentAccount;

/// Asserts that two Money values are approximately equal within a tolerance
///
/// # Panics
///
/// Panics if the currencies don't match or the amounts differ by more than
/// the tolerance
pub fn assert_money_approx_eq(actual: &Money, expected: &Money, tolerance: Decimal) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual.currency(),
        expected.currency()
    );

    let diff = (actual.amount() - expected.amount()).abs();
    assert!(
        diff <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual.amount(),
        expected.amount(),
        diff,
        tolerance
    );
}

/// Asserts that a Money value is positive
pub fn assert_money_positive(money: &Money) {
    assert!(
        money.is_positive(),
        "Expected positive money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that a Money value is negative
pub fn assert_money_negative(money: &Money) {
    assert!(
        money.is_negative(),
        "Expected negative money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that money values sum exactly to a total
///
/// # Panics
///
/// Panics if the sum doesn't equal the total
pub fn assert_money_sum(parts: &[Money], total: &Money) {
    let sum: Decimal = parts.iter().map(|p| p.amount()).sum();
    assert_eq!(
        sum,
        total.amount(),
        "Parts sum to {} but expected {}",
        sum,
        total.amount()
    );
}

/// Asserts that an account's movement history replays to its balance
///
/// # Panics
///
/// Panics with the chain violation message when the history has a gap,
/// an inconsistent step, or a final balance mismatch
pub fn assert_balance_chain(account: &CurrentAccount) {
    if let Err(violation) = account.verify_balance_chain() {
        panic!("Balance chain violated for account {}: {violation}", account.id);
    }
}
