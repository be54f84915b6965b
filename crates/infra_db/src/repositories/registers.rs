//! Cash register repository

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::{BranchId, CashRegisterId, UserId};
use domain_ledger::{CashMovement, CashRegister};

use crate::error::DatabaseError;
use crate::rows::{CashMovementRow, RegisterRow};

/// Repository for cash registers and their movements
#[derive(Debug, Clone)]
pub struct RegisterRepository {
    pool: PgPool,
}

impl RegisterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a freshly opened register together with its opening entry
    pub async fn insert(&self, register: &CashRegister) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO cash_registers
                (id, branch_id, user_id, opened_at, closed_at, currency, initial_amount,
                 final_amount, expected_cash_balance, cash_difference, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(Uuid::from(register.id))
        .bind(Uuid::from(register.branch_id))
        .bind(Uuid::from(register.user_id))
        .bind(register.opened_at)
        .bind(register.closed_at)
        .bind(register.currency().code())
        .bind(register.initial_amount.amount())
        .bind(register.final_amount.map(|m| m.amount()))
        .bind(register.expected_cash_balance.map(|m| m.amount()))
        .bind(register.cash_difference.map(|m| m.amount()))
        .bind(register.status.as_str())
        .execute(&mut *tx)
        .await?;

        for movement in register.movements() {
            insert_cash_movement(&mut *tx, movement).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Fetches a register with its full movement history
    pub async fn get(&self, id: CashRegisterId) -> Result<CashRegister, DatabaseError> {
        let row = fetch_register(&self.pool, id, false).await?;
        let movements = fetch_cash_movements(&self.pool, id).await?;
        row.into_domain(movements)
    }

    /// Finds the open register for a user at a branch, if any
    pub async fn find_open(
        &self,
        branch_id: BranchId,
        user_id: UserId,
    ) -> Result<Option<CashRegister>, DatabaseError> {
        let row = sqlx::query_as::<_, RegisterRow>(
            r#"
            SELECT id, branch_id, user_id, opened_at, closed_at, currency, initial_amount,
                   final_amount, expected_cash_balance, cash_difference, status
            FROM cash_registers
            WHERE branch_id = $1 AND user_id = $2 AND status = 'open'
            ORDER BY opened_at DESC
            LIMIT 1
            "#,
        )
        .bind(Uuid::from(branch_id))
        .bind(Uuid::from(user_id))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let id = CashRegisterId::from_uuid(row.id);
                let movements = fetch_cash_movements(&self.pool, id).await?;
                Ok(Some(row.into_domain(movements)?))
            }
            None => Ok(None),
        }
    }

    /// Branches where the user currently has an open register
    ///
    /// Charge payments are booked at a branch; when the user works more than
    /// one, the payment request must name it explicitly.
    pub async fn open_branches(&self, user_id: UserId) -> Result<Vec<BranchId>, DatabaseError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT branch_id
            FROM cash_registers
            WHERE user_id = $1 AND status = 'open'
            ORDER BY branch_id
            "#,
        )
        .bind(Uuid::from(user_id))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(branch_id,)| BranchId::from_uuid(branch_id))
            .collect())
    }
}

/// Fetches a register row, optionally taking a row lock
pub async fn fetch_register<'e>(
    executor: impl PgExecutor<'e>,
    id: CashRegisterId,
    for_update: bool,
) -> Result<RegisterRow, DatabaseError> {
    let base = r#"
        SELECT id, branch_id, user_id, opened_at, closed_at, currency, initial_amount,
               final_amount, expected_cash_balance, cash_difference, status
        FROM cash_registers
        WHERE id = $1
    "#;
    let query = if for_update {
        format!("{base} FOR UPDATE")
    } else {
        base.to_string()
    };

    sqlx::query_as::<_, RegisterRow>(&query)
        .bind(Uuid::from(id))
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("CashRegister", id))
}

/// Fetches a register's movements, oldest first
pub async fn fetch_cash_movements<'e>(
    executor: impl PgExecutor<'e>,
    id: CashRegisterId,
) -> Result<Vec<CashMovement>, DatabaseError> {
    let rows = sqlx::query_as::<_, CashMovementRow>(
        r#"
        SELECT id, register_id, movement_type_id, kind, direction, is_system,
               payment_method_id, currency, amount, affects_balance, reference_type,
               reference_id, user_id, created_at
        FROM cash_movements
        WHERE register_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(Uuid::from(id))
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(CashMovementRow::into_domain).collect()
}

/// Appends one cash movement row; movements are insert-only
pub async fn insert_cash_movement<'e>(
    executor: impl PgExecutor<'e>,
    movement: &CashMovement,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO cash_movements
            (id, register_id, movement_type_id, kind, direction, is_system,
             payment_method_id, currency, amount, affects_balance, reference_type,
             reference_id, user_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(Uuid::from(movement.id))
    .bind(Uuid::from(movement.register_id))
    .bind(Uuid::from(movement.movement_type_id))
    .bind(movement.kind.as_str())
    .bind(movement.direction.as_str())
    .bind(movement.is_system)
    .bind(movement.payment_method_id.map(Uuid::from))
    .bind(movement.amount.currency().code())
    .bind(movement.amount.amount())
    .bind(movement.affects_balance)
    .bind(movement.reference_type.as_deref())
    .bind(movement.reference_id)
    .bind(Uuid::from(movement.user_id))
    .bind(movement.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Persists the closing snapshot of a register
pub async fn update_close<'e>(
    executor: impl PgExecutor<'e>,
    register: &CashRegister,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE cash_registers
        SET closed_at = $2, final_amount = $3, expected_cash_balance = $4,
            cash_difference = $5, status = $6
        WHERE id = $1
        "#,
    )
    .bind(Uuid::from(register.id))
    .bind(register.closed_at)
    .bind(register.final_amount.map(|m| m.amount()))
    .bind(register.expected_cash_balance.map(|m| m.amount()))
    .bind(register.cash_difference.map(|m| m.amount()))
    .bind(register.status.as_str())
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("CashRegister", register.id));
    }
    Ok(())
}
