//! Sale payment tracking
//!
//! A sale tracks how much of its total (plus any financing surcharges posted
//! against it) has been settled. The payment status only moves forward:
//! `Pending -> Partial -> Paid`, never back.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, SaleId};
use domain_ledger::CurrentAccountMovement;

use crate::error::PaymentError;

/// Settlement progress of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalePaymentStatus {
    Pending,
    Partial,
    Paid,
}

impl SalePaymentStatus {
    /// Stable string form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SalePaymentStatus::Pending => "pending",
            SalePaymentStatus::Partial => "partial",
            SalePaymentStatus::Paid => "paid",
        }
    }
}

impl std::str::FromStr for SalePaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SalePaymentStatus::Pending),
            "partial" => Ok(SalePaymentStatus::Partial),
            "paid" => Ok(SalePaymentStatus::Paid),
            other => Err(PaymentError::InvalidAmount(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

/// The payment-facing slice of a sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub total: Money,
    paid_amount: Money,
    payment_status: SalePaymentStatus,
    /// Cached surcharge total; None forces a recompute from the movement history
    surcharge_total: Option<Money>,
}

impl Sale {
    /// Creates a fresh, fully unpaid sale
    pub fn new(id: SaleId, total: Money) -> Self {
        Self {
            id,
            total,
            paid_amount: Money::zero(total.currency()),
            payment_status: SalePaymentStatus::Pending,
            surcharge_total: None,
        }
    }

    /// Rehydrates a sale from persisted state
    pub fn from_parts(
        id: SaleId,
        total: Money,
        paid_amount: Money,
        payment_status: SalePaymentStatus,
        surcharge_total: Option<Money>,
    ) -> Self {
        Self {
            id,
            total,
            paid_amount,
            payment_status,
            surcharge_total,
        }
    }

    /// Seeds the surcharge cache
    pub fn with_cached_surcharge_total(mut self, surcharge_total: Money) -> Self {
        self.surcharge_total = Some(surcharge_total);
        self
    }

    pub fn currency(&self) -> core_kernel::Currency {
        self.total.currency()
    }

    pub fn paid_amount(&self) -> Money {
        self.paid_amount
    }

    pub fn payment_status(&self) -> SalePaymentStatus {
        self.payment_status
    }

    /// Cached surcharge total, if one was loaded
    pub fn cached_surcharge_total(&self) -> Option<Money> {
        self.surcharge_total
    }

    /// Total of surcharge movements posted against this sale
    ///
    /// Uses the cached value when present; otherwise sums the surcharge
    /// movements linked to this sale in the account history.
    pub fn surcharge_total(&self, movements: &[CurrentAccountMovement]) -> Money {
        if let Some(cached) = self.surcharge_total {
            return cached;
        }

        movements
            .iter()
            .filter(|m| m.sale_id == Some(self.id) && m.is_surcharge())
            .fold(Money::zero(self.currency()), |acc, m| acc + m.amount)
    }

    /// Amount still owed: sale total plus surcharges, minus what was paid
    ///
    /// Floored at zero so a historical overpayment never produces a negative
    /// pending balance.
    pub fn pending_amount(&self, surcharge_total: Money) -> Money {
        let effective = self.total + surcharge_total;
        let pending = effective - self.paid_amount;
        if pending.is_negative() {
            Money::zero(self.currency())
        } else {
            pending
        }
    }

    /// Registers a settled amount and advances the payment status
    ///
    /// When the remainder after the payment is within one minor currency unit,
    /// the sale snaps to `Paid` and `paid_amount` is set to the effective
    /// total, so accumulated rounding dust can never strand a sale in
    /// `Partial` forever.
    pub fn record_payment(
        &mut self,
        amount: Money,
        surcharge_total: Money,
    ) -> Result<SalePaymentStatus, PaymentError> {
        if amount.is_negative() {
            return Err(PaymentError::InvalidAmount(format!(
                "sale payment must be non-negative, got {}",
                amount.amount()
            )));
        }

        self.paid_amount = self.paid_amount.checked_add(&amount)?;

        let effective = self.total.checked_add(&surcharge_total)?;
        let remainder = effective.checked_sub(&self.paid_amount)?;
        let epsilon = self.currency().minor_unit();

        if remainder.amount() <= epsilon {
            self.paid_amount = effective;
            self.payment_status = SalePaymentStatus::Paid;
        } else if self.paid_amount.is_positive() && self.payment_status == SalePaymentStatus::Pending
        {
            self.payment_status = SalePaymentStatus::Partial;
        }

        Ok(self.payment_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn ars(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::ARS)
    }

    fn sale(total: rust_decimal::Decimal) -> Sale {
        Sale::new(SaleId::new(), ars(total))
    }

    #[test]
    fn test_partial_then_paid() {
        let mut sale = sale(dec!(100));
        let none = ars(dec!(0));

        assert_eq!(
            sale.record_payment(ars(dec!(40)), none).unwrap(),
            SalePaymentStatus::Partial
        );
        assert_eq!(sale.pending_amount(none).amount(), dec!(60));

        assert_eq!(
            sale.record_payment(ars(dec!(60)), none).unwrap(),
            SalePaymentStatus::Paid
        );
        assert_eq!(sale.pending_amount(none).amount(), dec!(0));
    }

    #[test]
    fn test_epsilon_snaps_to_paid() {
        let mut sale = sale(dec!(100));
        let none = ars(dec!(0));

        // 99.995 leaves 0.005 pending, within the 0.01 minor unit
        sale.record_payment(ars(dec!(99.995)), none).unwrap();
        assert_eq!(sale.payment_status(), SalePaymentStatus::Paid);
        assert_eq!(sale.paid_amount().amount(), dec!(100));
    }

    #[test]
    fn test_surcharge_raises_effective_total() {
        let mut sale = sale(dec!(100));
        let surcharge = ars(dec!(15));

        sale.record_payment(ars(dec!(100)), surcharge).unwrap();
        assert_eq!(sale.payment_status(), SalePaymentStatus::Partial);
        assert_eq!(sale.pending_amount(surcharge).amount(), dec!(15));
    }

    #[test]
    fn test_status_never_regresses() {
        let mut sale = sale(dec!(50));
        let none = ars(dec!(0));

        sale.record_payment(ars(dec!(50)), none).unwrap();
        assert_eq!(sale.payment_status(), SalePaymentStatus::Paid);

        // A later zero-amount touch must not demote the status
        sale.record_payment(ars(dec!(0)), none).unwrap();
        assert_eq!(sale.payment_status(), SalePaymentStatus::Paid);
    }

    #[test]
    fn test_negative_payment_rejected() {
        let mut sale = sale(dec!(50));
        let result = sale.record_payment(ars(dec!(-1)), ars(dec!(0)));
        assert!(matches!(result, Err(PaymentError::InvalidAmount(_))));
    }

    #[test]
    fn test_zero_decimal_currency_epsilon() {
        let mut sale = Sale::new(SaleId::new(), Money::new(dec!(1000), Currency::CLP));
        let none = Money::zero(Currency::CLP);

        // CLP has no decimals, so the snap window is one whole peso
        sale.record_payment(Money::new(dec!(999), Currency::CLP), none)
            .unwrap();
        assert_eq!(sale.payment_status(), SalePaymentStatus::Paid);
    }
}
