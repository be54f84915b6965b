//! Transactional payment and register-close services
//!
//! Each operation runs in a single database transaction. Rows are locked in
//! a fixed order (account, register, sales, charges) so concurrent payments
//! cannot deadlock against each other; when PostgreSQL still reports a
//! serialization failure, the whole transaction is retried with backoff.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use core_kernel::{BranchId, CashRegisterId, CurrentAccountId, Money};
use domain_ledger::{
    LedgerError, MovementKind, MovementTypeRegistry, PaymentMethodCatalog, RegisterTotals,
};
use domain_payments::{
    AdministrativeCharge, ChargeKind, PaymentContext, PaymentError, PaymentOutcome,
    PaymentProcessor, PaymentRequest,
};

use crate::error::DatabaseError;
use crate::pool::DatabasePool;
use crate::repositories::{accounts, registers, sales};
use crate::retry::with_retries;

/// Errors surfaced by the transactional services
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was rejected by domain validation
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The ledger rejected a state transition
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage failure
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    fn is_transient(&self) -> bool {
        matches!(self, ServiceError::Database(e) if e.is_retryable())
    }
}

/// Executes payment requests and register closes against the database
#[derive(Clone)]
pub struct PaymentService {
    pool: DatabasePool,
    types: Arc<MovementTypeRegistry>,
    methods: Arc<PaymentMethodCatalog>,
}

impl PaymentService {
    pub fn new(
        pool: DatabasePool,
        types: Arc<MovementTypeRegistry>,
        methods: Arc<PaymentMethodCatalog>,
    ) -> Self {
        Self {
            pool,
            types,
            methods,
        }
    }

    /// Allocates one payment across the selected sales and charges
    ///
    /// Loads and locks the account (and register, when a payment method is
    /// involved), rebuilds the aggregates, runs the allocation engine, and
    /// persists every new movement plus the updated progress rows in one
    /// transaction.
    #[instrument(skip(self, request), fields(account = %account_id))]
    pub async fn execute_payment(
        &self,
        account_id: CurrentAccountId,
        register_id: Option<CashRegisterId>,
        request: &PaymentRequest,
        eligible_branches: &[BranchId],
    ) -> Result<PaymentOutcome, ServiceError> {
        with_retries("execute_payment", ServiceError::is_transient, || {
            self.execute_payment_once(account_id, register_id, request, eligible_branches)
        })
        .await
    }

    async fn execute_payment_once(
        &self,
        account_id: CurrentAccountId,
        register_id: Option<CashRegisterId>,
        request: &PaymentRequest,
        eligible_branches: &[BranchId],
    ) -> Result<PaymentOutcome, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        // Lock order: account, register, sales, charges
        let account_row = accounts::fetch_account(&mut *tx, account_id, true).await?;
        let movements = accounts::fetch_movements(&mut *tx, account_id).await?;
        let mut account = account_row.into_domain(movements)?;
        let account_watermark = account.movements().len();

        let mut register = match register_id {
            Some(id) => {
                let row = registers::fetch_register(&mut *tx, id, true).await?;
                let movements = registers::fetch_cash_movements(&mut *tx, id).await?;
                Some(row.into_domain(movements)?)
            }
            None => None,
        };
        let register_watermark = register.as_ref().map(|r| r.movements().len()).unwrap_or(0);

        let sale_ids: Vec<_> = request.sale_payments.iter().map(|p| p.sale_id).collect();
        let charge_ids: Vec<_> = request.charge_payments.iter().map(|p| p.charge_id).collect();
        let mut sales = sales::fetch_sales_for_update(&mut *tx, &sale_ids).await?;
        let mut charges = sales::fetch_charges_for_update(&mut *tx, &charge_ids).await?;

        let processor = PaymentProcessor::new(&self.types, &self.methods);
        let outcome = processor.process(
            request,
            &mut PaymentContext {
                account: &mut account,
                register: register.as_mut(),
                sales: &mut sales,
                charges: &mut charges,
                eligible_branches,
            },
        )?;

        for movement in &account.movements()[account_watermark..] {
            accounts::insert_movement(&mut *tx, movement).await?;
        }
        accounts::update_balance(&mut *tx, &account).await?;

        if let Some(register) = &register {
            for movement in &register.movements()[register_watermark..] {
                registers::insert_cash_movement(&mut *tx, movement).await?;
            }
        }

        for sale in &sales {
            sales::update_sale_progress(&mut *tx, sale).await?;
        }
        for charge in &charges {
            sales::update_charge_progress(&mut *tx, charge).await?;
        }

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(
            account = %account_id,
            committed = %outcome.total_committed.amount(),
            movements = outcome.movement_ids.len(),
            "payment committed"
        );
        Ok(outcome)
    }

    /// Posts an interest or debit adjustment against an account and opens
    /// the matching payable charge
    #[instrument(skip(self), fields(account = %account_id))]
    pub async fn record_charge(
        &self,
        account_id: CurrentAccountId,
        kind: ChargeKind,
        amount: Money,
        reference: Option<String>,
    ) -> Result<AdministrativeCharge, ServiceError> {
        with_retries("record_charge", ServiceError::is_transient, || {
            self.record_charge_once(account_id, kind, amount, reference.clone())
        })
        .await
    }

    async fn record_charge_once(
        &self,
        account_id: CurrentAccountId,
        kind: ChargeKind,
        amount: Money,
        reference: Option<String>,
    ) -> Result<AdministrativeCharge, ServiceError> {
        let movement_kind = match kind {
            ChargeKind::Interest => MovementKind::Interest,
            ChargeKind::DebitAdjustment => MovementKind::DebitAdjustment,
        };
        let movement_type = self.types.by_kind(movement_kind)?;

        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let row = accounts::fetch_account(&mut *tx, account_id, true).await?;
        let movements = accounts::fetch_movements(&mut *tx, account_id).await?;
        let mut account = row.into_domain(movements)?;

        let mut detail = domain_ledger::MovementDetail::new();
        if let Some(reference) = reference {
            detail = detail.with_reference(reference);
        }
        let movement = account.apply_movement(movement_type, amount, detail)?.clone();

        let charge = AdministrativeCharge::from_movement(&movement).ok_or_else(|| {
            PaymentError::InvalidAmount(format!(
                "movement kind {:?} cannot open a charge",
                movement.kind
            ))
        })?;

        accounts::insert_movement(&mut *tx, &movement).await?;
        accounts::update_balance(&mut *tx, &account).await?;
        sales::insert_charge(&mut *tx, &charge).await?;

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(account = %account_id, charge = %charge.id, "charge recorded");
        Ok(charge)
    }

    /// Closes a register, writing the automatic closing entry and the
    /// reconciliation snapshot
    #[instrument(skip(self), fields(register = %register_id))]
    pub async fn close_register(
        &self,
        register_id: CashRegisterId,
        final_amount: Option<Money>,
    ) -> Result<RegisterTotals, ServiceError> {
        with_retries("close_register", ServiceError::is_transient, || {
            self.close_register_once(register_id, final_amount)
        })
        .await
    }

    async fn close_register_once(
        &self,
        register_id: CashRegisterId,
        final_amount: Option<Money>,
    ) -> Result<RegisterTotals, ServiceError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let row = registers::fetch_register(&mut *tx, register_id, true).await?;
        let movements = registers::fetch_cash_movements(&mut *tx, register_id).await?;
        let mut register = row.into_domain(movements)?;
        let watermark = register.movements().len();

        // The closing entry documents the counted drawer; as a system type
        // it never feeds the derived totals.
        let auto_close = self.types.by_kind(MovementKind::RegisterAutoClose)?;
        let preview = register.recalculate(&self.methods);
        let closing_amount = final_amount.unwrap_or(preview.expected_cash_balance);
        register.record_movement(
            auto_close,
            closing_amount,
            None,
            true,
            register.user_id,
            Some(("cash_register".to_string(), Uuid::from(register_id))),
        )?;

        let totals = register.close(final_amount, &self.methods)?;

        for movement in &register.movements()[watermark..] {
            registers::insert_cash_movement(&mut *tx, movement).await?;
        }
        registers::update_close(&mut *tx, &register).await?;

        tx.commit().await.map_err(DatabaseError::from)?;

        info!(
            register = %register_id,
            expected = %totals.expected_cash_balance.amount(),
            "register closed"
        );
        Ok(totals)
    }
}
