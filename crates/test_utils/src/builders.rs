//! Test Data Builders
//!
//! Builder patterns for constructing domain aggregates with sensible
//! defaults. Tests specify only the fields they care about.

use rust_decimal::Decimal;

use core_kernel::{BranchId, CurrentAccountId, Currency, CustomerId, Money, SaleId, UserId};
use domain_ledger::{
    CashRegister, CurrentAccount, MovementDetail, MovementKind, MovementTypeRegistry,
};
use domain_payments::{AdministrativeCharge, ChargeKind, Sale, SalePaymentStatus};

/// Builder for current accounts with a seeded movement history
pub struct AccountBuilder {
    customer_id: CustomerId,
    currency: Currency,
    credit_limit: Option<Money>,
    debt: Option<Money>,
    favor_credit: Option<Money>,
}

impl Default for AccountBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountBuilder {
    pub fn new() -> Self {
        Self {
            customer_id: CustomerId::new(),
            currency: Currency::ARS,
            credit_limit: None,
            debt: None,
            favor_credit: None,
        }
    }

    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_credit_limit(mut self, limit: Decimal) -> Self {
        self.credit_limit = Some(Money::new(limit, self.currency));
        self
    }

    /// Seeds an opening debt via a sale movement
    pub fn with_debt(mut self, amount: Decimal) -> Self {
        self.debt = Some(Money::new(amount, self.currency));
        self
    }

    /// Seeds usable favor credit via an over-payment movement
    pub fn with_favor_credit(mut self, amount: Decimal) -> Self {
        self.favor_credit = Some(Money::new(amount, self.currency));
        self
    }

    /// Builds the account, applying the seeded movements
    pub fn build(self, types: &MovementTypeRegistry) -> CurrentAccount {
        let mut account = CurrentAccount::new(self.customer_id, self.currency);
        if let Some(limit) = self.credit_limit {
            account = account.with_credit_limit(limit);
        }

        if let Some(debt) = self.debt {
            let sale = types
                .by_kind(MovementKind::Sale)
                .expect("standard registry has a sale type");
            account
                .apply_movement(sale, debt, MovementDetail::new().authorize_over_limit())
                .expect("seeding debt on a fresh account");
        }

        if let Some(favor) = self.favor_credit {
            let payment = types
                .by_kind(MovementKind::Payment)
                .expect("standard registry has a payment type");
            account
                .apply_movement(payment, favor, MovementDetail::new())
                .expect("seeding favor credit on a fresh account");
        }

        account
    }
}

/// Builder for open cash registers
pub struct RegisterBuilder {
    branch_id: BranchId,
    user_id: UserId,
    currency: Currency,
    initial_amount: Decimal,
}

impl Default for RegisterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBuilder {
    pub fn new() -> Self {
        Self {
            branch_id: BranchId::new(),
            user_id: UserId::new(),
            currency: Currency::ARS,
            initial_amount: Decimal::ZERO,
        }
    }

    pub fn at_branch(mut self, branch_id: BranchId) -> Self {
        self.branch_id = branch_id;
        self
    }

    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_float(mut self, amount: Decimal) -> Self {
        self.initial_amount = amount;
        self
    }

    pub fn build(self, types: &MovementTypeRegistry) -> CashRegister {
        CashRegister::open(
            self.branch_id,
            self.user_id,
            Money::new(self.initial_amount, self.currency),
            types,
        )
        .expect("opening a register with the standard registry")
    }
}

/// Builder for sales in a chosen settlement state
pub struct SaleBuilder {
    id: SaleId,
    currency: Currency,
    total: Decimal,
    paid: Decimal,
}

impl Default for SaleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleBuilder {
    pub fn new() -> Self {
        Self {
            id: SaleId::new(),
            currency: Currency::ARS,
            total: Decimal::ONE_HUNDRED,
            paid: Decimal::ZERO,
        }
    }

    pub fn with_id(mut self, id: SaleId) -> Self {
        self.id = id;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total = total;
        self
    }

    pub fn partially_paid(mut self, paid: Decimal) -> Self {
        self.paid = paid;
        self
    }

    pub fn build(self) -> Sale {
        let total = Money::new(self.total, self.currency);
        let paid = Money::new(self.paid, self.currency);
        let status = if paid.is_zero() {
            SalePaymentStatus::Pending
        } else if paid.amount() < total.amount() {
            SalePaymentStatus::Partial
        } else {
            SalePaymentStatus::Paid
        };
        Sale::from_parts(self.id, total, paid, status, None)
    }
}

/// Builder for administrative charges
pub struct ChargeBuilder {
    account_id: CurrentAccountId,
    kind: ChargeKind,
    currency: Currency,
    total: Decimal,
    paid: Decimal,
}

impl Default for ChargeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChargeBuilder {
    pub fn new() -> Self {
        Self {
            account_id: CurrentAccountId::new(),
            kind: ChargeKind::Interest,
            currency: Currency::ARS,
            total: Decimal::TEN,
            paid: Decimal::ZERO,
        }
    }

    pub fn for_account(mut self, account_id: CurrentAccountId) -> Self {
        self.account_id = account_id;
        self
    }

    pub fn with_kind(mut self, kind: ChargeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_total(mut self, total: Decimal) -> Self {
        self.total = total;
        self
    }

    pub fn partially_paid(mut self, paid: Decimal) -> Self {
        self.paid = paid;
        self
    }

    pub fn build(self) -> AdministrativeCharge {
        AdministrativeCharge::from_parts(
            core_kernel::ChargeId::new(),
            self.account_id,
            self.kind,
            Money::new(self.total, self.currency),
            Money::new(self.paid, self.currency),
        )
    }
}
