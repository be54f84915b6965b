//! Comprehensive tests for the payment allocation engine

use rust_decimal_macros::dec;

use core_kernel::{BranchId, ChargeId, Currency, CustomerId, Money, SaleId, UserId};
use domain_ledger::{
    CashRegister, CurrentAccount, MovementDetail, MovementKind, MovementTypeRegistry,
    PaymentMethodCatalog,
};
use domain_payments::{
    distribute_proportionally, AdministrativeCharge, ChargeKind, PaymentContext, PaymentError,
    PaymentProcessor, PaymentRequest, Sale, SalePaymentStatus,
};

fn ars(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::ARS)
}

fn setup() -> (MovementTypeRegistry, PaymentMethodCatalog) {
    (
        MovementTypeRegistry::standard(),
        PaymentMethodCatalog::standard(),
    )
}

/// Gives the account a negative balance (credit in the customer's favor)
fn grant_favor_credit(
    account: &mut CurrentAccount,
    types: &MovementTypeRegistry,
    amount: Money,
) {
    let payment = types.by_kind(MovementKind::Payment).unwrap();
    account
        .apply_movement(payment, amount, MovementDetail::new())
        .unwrap();
}

// ============================================================================
// Allocation scenarios
// ============================================================================

mod payment_scenarios {
    use super::*;

    #[test]
    fn test_cash_payment_settles_multiple_sales() {
        let (types, methods) = setup();
        let user = UserId::new();
        let cash = methods.find_by_name("Efectivo").unwrap();

        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        let mut register =
            CashRegister::open(BranchId::new(), user, ars(dec!(500)), &types).unwrap();
        let mut sales = vec![
            Sale::new(SaleId::new(), ars(dec!(100))),
            Sale::new(SaleId::new(), ars(dec!(50))),
            Sale::new(SaleId::new(), ars(dec!(25))),
        ];

        let request = PaymentRequest::new(user)
            .with_method(cash.id)
            .pay_sale_in_full(sales[0].id)
            .pay_sale_in_full(sales[1].id)
            .pay_sale_in_full(sales[2].id);

        let processor = PaymentProcessor::new(&types, &methods);
        let outcome = processor
            .process(
                &request,
                &mut PaymentContext {
                    account: &mut account,
                    register: Some(&mut register),
                    sales: &mut sales,
                    charges: &mut [],
                    eligible_branches: &[],
                },
            )
            .unwrap();

        assert_eq!(outcome.total_committed.amount(), dec!(175));
        assert_eq!(outcome.cash_amount.amount(), dec!(175));
        assert_eq!(outcome.favor_credit_used.amount(), dec!(0));
        assert!(!outcome.is_partial_payment);
        assert_eq!(outcome.remaining_pending.amount(), dec!(0));
        assert!(outcome.cash_movement_id.is_some());

        // Settlement pairs net to zero on a method-funded payment
        assert_eq!(account.current_balance().amount(), dec!(0));
        account.verify_balance_chain().unwrap();

        for sale in &sales {
            assert_eq!(sale.payment_status(), SalePaymentStatus::Paid);
        }

        // Auto-open entry plus exactly one cash movement for the whole request
        assert_eq!(register.movements().len(), 2);
        assert_eq!(register.movements()[1].amount.amount(), dec!(175));
    }

    #[test]
    fn test_favor_credit_partial_payment() {
        let (types, methods) = setup();
        let user = UserId::new();

        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(30)));
        assert_eq!(account.available_favor_credit().amount(), dec!(30));

        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(100)))];
        let request = PaymentRequest::new(user)
            .with_favor_credit(ars(dec!(30)))
            .pay_sale(sales[0].id, ars(dec!(30)));

        let processor = PaymentProcessor::new(&types, &methods);
        let outcome = processor
            .process(
                &request,
                &mut PaymentContext {
                    account: &mut account,
                    register: None,
                    sales: &mut sales,
                    charges: &mut [],
                    eligible_branches: &[],
                },
            )
            .unwrap();

        assert!(outcome.is_partial_payment);
        assert_eq!(outcome.remaining_pending.amount(), dec!(70));
        assert_eq!(outcome.favor_credit_used.amount(), dec!(30));
        assert_eq!(outcome.cash_amount.amount(), dec!(0));
        assert!(outcome.cash_movement_id.is_none());

        // The favor credit was debited back to zero
        assert_eq!(account.current_balance().amount(), dec!(0));
        assert_eq!(account.available_favor_credit().amount(), dec!(0));
        assert_eq!(sales[0].payment_status(), SalePaymentStatus::Partial);
    }

    #[test]
    fn test_mixed_funding_cash_and_favor_credit() {
        let (types, methods) = setup();
        let user = UserId::new();
        let cash = methods.find_by_name("Efectivo").unwrap();

        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(20)));

        let mut register =
            CashRegister::open(BranchId::new(), user, ars(dec!(0)), &types).unwrap();
        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(100)))];

        let request = PaymentRequest::new(user)
            .with_method(cash.id)
            .with_favor_credit(ars(dec!(20)))
            .pay_sale_in_full(sales[0].id);

        let processor = PaymentProcessor::new(&types, &methods);
        let outcome = processor
            .process(
                &request,
                &mut PaymentContext {
                    account: &mut account,
                    register: Some(&mut register),
                    sales: &mut sales,
                    charges: &mut [],
                    eligible_branches: &[],
                },
            )
            .unwrap();

        assert_eq!(outcome.total_committed.amount(), dec!(100));
        assert_eq!(outcome.favor_credit_used.amount(), dec!(20));
        assert_eq!(outcome.cash_amount.amount(), dec!(80));

        // Only the instrument-funded portion reaches the drawer
        assert_eq!(register.movements()[1].amount.amount(), dec!(80));
        assert_eq!(account.current_balance().amount(), dec!(0));
        assert_eq!(sales[0].payment_status(), SalePaymentStatus::Paid);
    }

    #[test]
    fn test_charge_payment_reduces_account_debt() {
        let (types, methods) = setup();
        let user = UserId::new();
        let cash = methods.find_by_name("Efectivo").unwrap();
        let interest = types.by_kind(MovementKind::Interest).unwrap();

        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        account
            .apply_movement(interest, ars(dec!(30)), MovementDetail::new())
            .unwrap();
        assert_eq!(account.current_balance().amount(), dec!(30));

        let mut charges = vec![AdministrativeCharge::new(
            account.id,
            ChargeKind::Interest,
            ars(dec!(30)),
        )];
        let branch = BranchId::new();
        let mut register = CashRegister::open(branch, user, ars(dec!(0)), &types).unwrap();

        let request = PaymentRequest::new(user)
            .with_method(cash.id)
            .at_branch(branch)
            .pay_charge(charges[0].id, ars(dec!(30)));

        let processor = PaymentProcessor::new(&types, &methods);
        let outcome = processor
            .process(
                &request,
                &mut PaymentContext {
                    account: &mut account,
                    register: Some(&mut register),
                    sales: &mut [],
                    charges: &mut charges,
                    eligible_branches: &[branch],
                },
            )
            .unwrap();

        // Charges post only the inflow: the debt was already on the account
        assert_eq!(account.current_balance().amount(), dec!(0));
        assert!(charges[0].is_settled());
        assert_eq!(outcome.cash_amount.amount(), dec!(30));
        account.verify_balance_chain().unwrap();
    }

    #[test]
    fn test_proportional_favor_credit_across_sales() {
        let (types, methods) = setup();
        let user = UserId::new();

        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(120)));

        let mut sales = vec![
            Sale::new(SaleId::new(), ars(dec!(100))),
            Sale::new(SaleId::new(), ars(dec!(50))),
            Sale::new(SaleId::new(), ars(dec!(25))),
        ];
        let request = PaymentRequest::new(user)
            .with_favor_credit(ars(dec!(120)))
            .pay_sale(sales[0].id, ars(dec!(68.57)))
            .pay_sale(sales[1].id, ars(dec!(34.29)))
            .pay_sale(sales[2].id, ars(dec!(17.14)));

        let processor = PaymentProcessor::new(&types, &methods);
        let outcome = processor
            .process(
                &request,
                &mut PaymentContext {
                    account: &mut account,
                    register: None,
                    sales: &mut sales,
                    charges: &mut [],
                    eligible_branches: &[],
                },
            )
            .unwrap();

        assert_eq!(outcome.total_committed.amount(), dec!(120));
        assert_eq!(outcome.favor_credit_used.amount(), dec!(120));
        assert_eq!(outcome.cash_amount.amount(), dec!(0));
        assert!(outcome.is_partial_payment);
        assert_eq!(account.current_balance().amount(), dec!(0));
    }

    #[test]
    fn test_favor_only_full_selection_commits_only_the_credit() {
        let (types, methods) = setup();
        let user = UserId::new();

        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(30)));

        // Selecting the whole sale with only 30 of favor credit must not
        // settle more than the credit actually funds.
        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(100)))];
        let request = PaymentRequest::new(user)
            .with_favor_credit(ars(dec!(30)))
            .pay_sale_in_full(sales[0].id);

        let processor = PaymentProcessor::new(&types, &methods);
        let outcome = processor
            .process(
                &request,
                &mut PaymentContext {
                    account: &mut account,
                    register: None,
                    sales: &mut sales,
                    charges: &mut [],
                    eligible_branches: &[],
                },
            )
            .unwrap();

        assert_eq!(outcome.total_committed.amount(), dec!(30));
        assert_eq!(outcome.favor_credit_used.amount(), dec!(30));
        assert_eq!(outcome.cash_amount.amount(), dec!(0));
        assert!(outcome.cash_movement_id.is_none());
        assert!(outcome.is_partial_payment);
        assert_eq!(outcome.remaining_pending.amount(), dec!(70));

        assert_eq!(account.current_balance().amount(), dec!(0));
        assert_eq!(account.available_favor_credit().amount(), dec!(0));
        assert_eq!(sales[0].paid_amount().amount(), dec!(30));
        assert_eq!(sales[0].payment_status(), SalePaymentStatus::Partial);
        account.verify_balance_chain().unwrap();
    }

    #[test]
    fn test_favor_only_full_selection_splits_across_sales() {
        let (types, methods) = setup();
        let user = UserId::new();

        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(120)));

        let mut sales = vec![
            Sale::new(SaleId::new(), ars(dec!(100))),
            Sale::new(SaleId::new(), ars(dec!(50))),
            Sale::new(SaleId::new(), ars(dec!(25))),
        ];
        let request = PaymentRequest::new(user)
            .with_favor_credit(ars(dec!(120)))
            .pay_sale_in_full(sales[0].id)
            .pay_sale_in_full(sales[1].id)
            .pay_sale_in_full(sales[2].id);

        let processor = PaymentProcessor::new(&types, &methods);
        let outcome = processor
            .process(
                &request,
                &mut PaymentContext {
                    account: &mut account,
                    register: None,
                    sales: &mut sales,
                    charges: &mut [],
                    eligible_branches: &[],
                },
            )
            .unwrap();

        // Each sale is committed its proportional credit share
        assert_eq!(outcome.targets[0].committed.amount(), dec!(68.57));
        assert_eq!(outcome.targets[1].committed.amount(), dec!(34.29));
        assert_eq!(outcome.targets[2].committed.amount(), dec!(17.14));

        assert_eq!(outcome.total_committed.amount(), dec!(120));
        assert_eq!(outcome.favor_credit_used.amount(), dec!(120));
        assert_eq!(outcome.cash_amount.amount(), dec!(0));
        assert!(outcome.is_partial_payment);
        assert_eq!(account.current_balance().amount(), dec!(0));
        account.verify_balance_chain().unwrap();
    }
}

// ============================================================================
// Validation scenarios
// ============================================================================

mod validation_scenarios {
    use super::*;

    #[test]
    fn test_empty_selection_rejected() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);

        let request = PaymentRequest::new(UserId::new())
            .with_method(methods.find_by_name("Efectivo").unwrap().id);
        let processor = PaymentProcessor::new(&types, &methods);

        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut [],
                charges: &mut [],
                eligible_branches: &[],
            },
        );
        assert!(matches!(result, Err(PaymentError::EmptySelection)));
    }

    #[test]
    fn test_missing_instrument_rejected() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(10)))];

        let request = PaymentRequest::new(UserId::new()).pay_sale_in_full(sales[0].id);
        let processor = PaymentProcessor::new(&types, &methods);

        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut sales,
                charges: &mut [],
                eligible_branches: &[],
            },
        );
        assert!(matches!(result, Err(PaymentError::MissingInstrument)));
    }

    #[test]
    fn test_overpaying_a_sale_leaves_no_trace() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(200)));
        let movements_before = account.movements().len();

        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(100)))];
        let request = PaymentRequest::new(UserId::new())
            .with_favor_credit(ars(dec!(150)))
            .pay_sale(sales[0].id, ars(dec!(150)));

        let processor = PaymentProcessor::new(&types, &methods);
        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut sales,
                charges: &mut [],
                eligible_branches: &[],
            },
        );

        assert!(matches!(
            result,
            Err(PaymentError::AmountExceedsPending { .. })
        ));
        // Validation failed before any write
        assert_eq!(account.movements().len(), movements_before);
        assert_eq!(sales[0].paid_amount().amount(), dec!(0));
        assert_eq!(sales[0].payment_status(), SalePaymentStatus::Pending);
    }

    #[test]
    fn test_favor_credit_beyond_balance_rejected() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(10)));

        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(100)))];
        let request = PaymentRequest::new(UserId::new())
            .with_favor_credit(ars(dec!(50)))
            .pay_sale(sales[0].id, ars(dec!(50)));

        let processor = PaymentProcessor::new(&types, &methods);
        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut sales,
                charges: &mut [],
                eligible_branches: &[],
            },
        );
        assert!(matches!(
            result,
            Err(PaymentError::InsufficientFavorCredit { .. })
        ));
    }

    #[test]
    fn test_favor_credit_cannot_fund_charges() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(50)));

        let mut charges = vec![AdministrativeCharge::new(
            account.id,
            ChargeKind::Interest,
            ars(dec!(30)),
        )];
        let request = PaymentRequest::new(UserId::new())
            .with_favor_credit(ars(dec!(30)))
            .pay_charge(charges[0].id, ars(dec!(30)));

        let processor = PaymentProcessor::new(&types, &methods);
        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut [],
                charges: &mut charges,
                eligible_branches: &[],
            },
        );
        assert!(matches!(
            result,
            Err(PaymentError::FavorCreditExceedsRequested { .. })
        ));
    }

    #[test]
    fn test_charges_need_a_payment_method_even_with_favor_credit() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(50)));

        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(50)))];
        let mut charges = vec![AdministrativeCharge::new(
            account.id,
            ChargeKind::Interest,
            ars(dec!(20)),
        )];

        // Favor credit covers the sale exactly, but the charge has no
        // instrument behind it.
        let request = PaymentRequest::new(UserId::new())
            .with_favor_credit(ars(dec!(50)))
            .pay_sale_in_full(sales[0].id)
            .pay_charge(charges[0].id, ars(dec!(20)));

        let processor = PaymentProcessor::new(&types, &methods);
        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut sales,
                charges: &mut charges,
                eligible_branches: &[],
            },
        );
        assert!(matches!(result, Err(PaymentError::MissingInstrument)));
    }

    #[test]
    fn test_method_payment_requires_register() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(10)))];

        let request = PaymentRequest::new(UserId::new())
            .with_method(methods.find_by_name("Efectivo").unwrap().id)
            .pay_sale_in_full(sales[0].id);

        let processor = PaymentProcessor::new(&types, &methods);
        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut sales,
                charges: &mut [],
                eligible_branches: &[],
            },
        );
        assert!(matches!(result, Err(PaymentError::MissingRegister(_))));
    }

    #[test]
    fn test_duplicate_sale_selection_rejected() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(50)));

        let mut sales = vec![Sale::new(SaleId::new(), ars(dec!(100)))];
        let request = PaymentRequest::new(UserId::new())
            .with_favor_credit(ars(dec!(20)))
            .pay_sale(sales[0].id, ars(dec!(10)))
            .pay_sale(sales[0].id, ars(dec!(10)));

        let processor = PaymentProcessor::new(&types, &methods);
        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut sales,
                charges: &mut [],
                eligible_branches: &[],
            },
        );
        assert!(matches!(result, Err(PaymentError::InvalidAmount(_))));
    }

    #[test]
    fn test_unknown_sale_rejected() {
        let (types, methods) = setup();
        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        grant_favor_credit(&mut account, &types, ars(dec!(50)));

        let request = PaymentRequest::new(UserId::new())
            .with_favor_credit(ars(dec!(10)))
            .pay_sale(SaleId::new(), ars(dec!(10)));

        let processor = PaymentProcessor::new(&types, &methods);
        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: None,
                sales: &mut [],
                charges: &mut [],
                eligible_branches: &[],
            },
        );
        assert!(matches!(result, Err(PaymentError::UnknownSale(_))));
    }

    #[test]
    fn test_branch_required_when_paying_charges_across_branches() {
        let (types, methods) = setup();
        let user = UserId::new();
        let cash = methods.find_by_name("Efectivo").unwrap();
        let branches = [BranchId::new(), BranchId::new()];

        let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
        let mut charges = vec![AdministrativeCharge::new(
            account.id,
            ChargeKind::Interest,
            ars(dec!(30)),
        )];
        let mut register = CashRegister::open(branches[0], user, ars(dec!(0)), &types).unwrap();

        let request = PaymentRequest::new(user)
            .with_method(cash.id)
            .pay_charge(charges[0].id, ars(dec!(30)));

        let processor = PaymentProcessor::new(&types, &methods);
        let result = processor.process(
            &request,
            &mut PaymentContext {
                account: &mut account,
                register: Some(&mut register),
                sales: &mut [],
                charges: &mut charges,
                eligible_branches: &branches,
            },
        );
        assert!(matches!(result, Err(PaymentError::MissingBranch)));

        // The same request with an explicit branch goes through
        let request = request.at_branch(branches[0]);
        processor
            .process(
                &request,
                &mut PaymentContext {
                    account: &mut account,
                    register: Some(&mut register),
                    sales: &mut [],
                    charges: &mut charges,
                    eligible_branches: &branches,
                },
            )
            .unwrap();
    }
}

// ============================================================================
// Property tests
// ============================================================================

mod conservation_properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every allocated unit is funded exactly once: the committed total
        /// always equals cash plus favor credit.
        #[test]
        fn committed_equals_cash_plus_favor_credit(
            totals in proptest::collection::vec(100i64..5_000_000i64, 1..6),
            favor_minor in 0i64..1_000_000i64,
        ) {
            let (types, methods) = setup();
            let user = UserId::new();
            let cash = methods.find_by_name("Efectivo").unwrap();

            let sale_sum: i64 = totals.iter().sum();
            let favor_minor = favor_minor.min(sale_sum);

            let mut account = CurrentAccount::new(CustomerId::new(), Currency::ARS);
            if favor_minor > 0 {
                grant_favor_credit(
                    &mut account,
                    &types,
                    Money::from_minor(favor_minor, Currency::ARS),
                );
            }

            let mut register =
                CashRegister::open(BranchId::new(), user, Money::zero(Currency::ARS), &types)
                    .unwrap();
            let mut sales: Vec<Sale> = totals
                .iter()
                .map(|minor| Sale::new(SaleId::new(), Money::from_minor(*minor, Currency::ARS)))
                .collect();

            let mut request = PaymentRequest::new(user).with_method(cash.id);
            if favor_minor > 0 {
                request = request
                    .with_favor_credit(Money::from_minor(favor_minor, Currency::ARS));
            }
            for sale in &sales {
                request = request.pay_sale_in_full(sale.id);
            }

            let processor = PaymentProcessor::new(&types, &methods);
            let outcome = processor
                .process(
                    &request,
                    &mut PaymentContext {
                        account: &mut account,
                        register: Some(&mut register),
                        sales: &mut sales,
                        charges: &mut [],
                        eligible_branches: &[],
                    },
                )
                .unwrap();

            let funded = outcome.cash_amount.checked_add(&outcome.favor_credit_used).unwrap();
            prop_assert_eq!(outcome.total_committed, funded);
            prop_assert_eq!(
                outcome.total_committed,
                Money::from_minor(sale_sum, Currency::ARS)
            );
            prop_assert!(account.verify_balance_chain().is_ok());
        }

        /// Proportional distribution assigns exactly min(credit, total pending)
        /// and never exceeds any target's pending amount.
        #[test]
        fn distribution_is_exhaustive_and_capped(
            pendings in proptest::collection::vec(1i64..10_000_000i64, 1..8),
            credit in 1i64..20_000_000i64,
        ) {
            let pendings: Vec<Money> = pendings
                .iter()
                .map(|minor| Money::from_minor(*minor, Currency::ARS))
                .collect();
            let credit = Money::from_minor(credit, Currency::ARS);

            let shares = distribute_proportionally(credit, &pendings).unwrap();

            let mut total_pending = Money::zero(Currency::ARS);
            for pending in &pendings {
                total_pending = total_pending + *pending;
            }
            let mut assigned = Money::zero(Currency::ARS);
            for (share, pending) in shares.iter().zip(&pendings) {
                prop_assert!(share.amount() <= pending.amount());
                prop_assert!(!share.is_negative());
                assigned = assigned + *share;
            }

            let expected = credit.checked_min(&total_pending).unwrap();
            prop_assert_eq!(assigned, expected);
        }
    }
}
