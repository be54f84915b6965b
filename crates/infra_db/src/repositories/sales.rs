//! Sale and administrative charge repository
//!
//! Stores the payment-facing slice of sales (total, paid amount, status) and
//! the charge settlement records the allocation engine updates.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::{ChargeId, CurrentAccountId, SaleId};
use domain_payments::{AdministrativeCharge, Sale};

use crate::error::DatabaseError;
use crate::rows::{ChargeRow, SaleRow};

/// Repository for sales and administrative charges
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a new sale against an account
    pub async fn insert_sale(
        &self,
        account_id: CurrentAccountId,
        sale: &Sale,
    ) -> Result<(), DatabaseError> {
        insert_sale(&self.pool, account_id, sale).await
    }

    /// Records a new administrative charge
    pub async fn insert_charge(&self, charge: &AdministrativeCharge) -> Result<(), DatabaseError> {
        insert_charge(&self.pool, charge).await
    }

    /// Sales of an account that are not fully paid, oldest debt first
    pub async fn pending_sales(
        &self,
        account_id: CurrentAccountId,
    ) -> Result<Vec<Sale>, DatabaseError> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, account_id, currency, total, paid_amount, payment_status, surcharge_total
            FROM sales
            WHERE account_id = $1 AND payment_status <> 'paid'
            ORDER BY id
            "#,
        )
        .bind(Uuid::from(account_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_domain).collect()
    }

    /// Charges of an account that still have a pending balance
    pub async fn open_charges(
        &self,
        account_id: CurrentAccountId,
    ) -> Result<Vec<AdministrativeCharge>, DatabaseError> {
        let rows = sqlx::query_as::<_, ChargeRow>(
            r#"
            SELECT id, account_id, kind, currency, total_amount, paid_amount
            FROM administrative_charges
            WHERE account_id = $1 AND paid_amount < total_amount
            ORDER BY id
            "#,
        )
        .bind(Uuid::from(account_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChargeRow::into_domain).collect()
    }
}

/// Inserts a sale row
pub async fn insert_sale<'e>(
    executor: impl PgExecutor<'e>,
    account_id: CurrentAccountId,
    sale: &Sale,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO sales
            (id, account_id, currency, total, paid_amount, payment_status, surcharge_total)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::from(sale.id))
    .bind(Uuid::from(account_id))
    .bind(sale.currency().code())
    .bind(sale.total.amount())
    .bind(sale.paid_amount().amount())
    .bind(sale.payment_status().as_str())
    .bind(sale.cached_surcharge_total().map(|m| m.amount()))
    .execute(executor)
    .await?;
    Ok(())
}

/// Inserts a charge row
pub async fn insert_charge<'e>(
    executor: impl PgExecutor<'e>,
    charge: &AdministrativeCharge,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO administrative_charges
            (id, account_id, kind, currency, total_amount, paid_amount)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(Uuid::from(charge.id))
    .bind(Uuid::from(charge.account_id))
    .bind(charge.kind.as_str())
    .bind(charge.total_amount().currency().code())
    .bind(charge.total_amount().amount())
    .bind(charge.paid_amount().amount())
    .execute(executor)
    .await?;
    Ok(())
}

/// Locks and fetches the selected sales
pub async fn fetch_sales_for_update<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[SaleId],
) -> Result<Vec<Sale>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let uuids: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();

    let rows = sqlx::query_as::<_, SaleRow>(
        r#"
        SELECT id, account_id, currency, total, paid_amount, payment_status, surcharge_total
        FROM sales
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(&uuids)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(SaleRow::into_domain).collect()
}

/// Locks and fetches the selected charges
pub async fn fetch_charges_for_update<'e>(
    executor: impl PgExecutor<'e>,
    ids: &[ChargeId],
) -> Result<Vec<AdministrativeCharge>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let uuids: Vec<Uuid> = ids.iter().copied().map(Uuid::from).collect();

    let rows = sqlx::query_as::<_, ChargeRow>(
        r#"
        SELECT id, account_id, kind, currency, total_amount, paid_amount
        FROM administrative_charges
        WHERE id = ANY($1)
        ORDER BY id
        FOR UPDATE
        "#,
    )
    .bind(&uuids)
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(ChargeRow::into_domain).collect()
}

/// Persists the settlement progress of a sale
pub async fn update_sale_progress<'e>(
    executor: impl PgExecutor<'e>,
    sale: &Sale,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "UPDATE sales SET paid_amount = $2, payment_status = $3 WHERE id = $1",
    )
    .bind(Uuid::from(sale.id))
    .bind(sale.paid_amount().amount())
    .bind(sale.payment_status().as_str())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Sale", sale.id));
    }
    Ok(())
}

/// Persists the settlement progress of a charge
pub async fn update_charge_progress<'e>(
    executor: impl PgExecutor<'e>,
    charge: &AdministrativeCharge,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "UPDATE administrative_charges SET paid_amount = $2 WHERE id = $1",
    )
    .bind(Uuid::from(charge.id))
    .bind(charge.paid_amount().amount())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("AdministrativeCharge", charge.id));
    }
    Ok(())
}
