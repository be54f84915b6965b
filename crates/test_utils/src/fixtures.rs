//! Test Fixtures
//!
//! Pre-built test data for common entities, so tests only spell out the
//! values they actually care about.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{
    BranchId, CurrentAccountId, Currency, CustomerId, Money, PaymentMethodId, SaleId, UserId,
};
use domain_ledger::{MovementTypeRegistry, PaymentMethodCatalog};

/// Money values commonly used across tests
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Money in the default test currency (Argentine peso)
    pub fn ars(amount: Decimal) -> Money {
        Money::new(amount, Currency::ARS)
    }

    pub fn ars_zero() -> Money {
        Money::zero(Currency::ARS)
    }

    /// A typical over-the-counter sale total
    pub fn typical_sale() -> Money {
        Self::ars(dec!(1500))
    }

    /// A typical opening float for a cash register
    pub fn register_float() -> Money {
        Self::ars(dec!(500))
    }
}

/// Fresh identifiers for test entities
pub struct IdFixtures;

impl IdFixtures {
    pub fn customer_id() -> CustomerId {
        CustomerId::new()
    }

    pub fn account_id() -> CurrentAccountId {
        CurrentAccountId::new()
    }

    pub fn branch_id() -> BranchId {
        BranchId::new()
    }

    pub fn user_id() -> UserId {
        UserId::new()
    }

    pub fn sale_id() -> SaleId {
        SaleId::new()
    }
}

/// Shared reference catalogs
pub struct CatalogFixtures;

impl CatalogFixtures {
    /// The standard movement type registry
    pub fn movement_types() -> MovementTypeRegistry {
        MovementTypeRegistry::standard()
    }

    /// The standard payment method catalog
    pub fn payment_methods() -> PaymentMethodCatalog {
        PaymentMethodCatalog::standard()
    }

    /// The id of the standard cash method
    pub fn cash_method_id(methods: &PaymentMethodCatalog) -> PaymentMethodId {
        methods
            .find_by_name("Efectivo")
            .expect("standard catalog has a cash method")
            .id
    }

    /// The id of the standard credit card method
    pub fn card_method_id(methods: &PaymentMethodCatalog) -> PaymentMethodId {
        methods
            .find_by_name("Tarjeta de crédito")
            .expect("standard catalog has a credit card method")
            .id
    }
}
