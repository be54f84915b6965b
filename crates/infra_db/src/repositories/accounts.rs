//! Current account repository
//!
//! Accounts are the serialization point for payment processing: the account
//! row is locked `FOR UPDATE` before any movement is appended, so balance
//! chains can never interleave.

use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::CurrentAccountId;
use domain_ledger::{AccountStatus, CurrentAccount, CurrentAccountMovement};

use crate::error::DatabaseError;
use crate::rows::{AccountMovementRow, AccountRow};

/// Repository for customer current accounts
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new account
    pub async fn insert(&self, account: &CurrentAccount) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO current_accounts
                (id, customer_id, currency, credit_limit, current_balance, status,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::from(account.id))
        .bind(Uuid::from(account.customer_id))
        .bind(account.currency().code())
        .bind(account.credit_limit.map(|limit| limit.amount()))
        .bind(account.current_balance().amount())
        .bind(account.status.as_str())
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches an account with its full movement history
    pub async fn get(&self, id: CurrentAccountId) -> Result<CurrentAccount, DatabaseError> {
        let row = fetch_account(&self.pool, id, false).await?;
        let movements = fetch_movements(&self.pool, id).await?;
        row.into_domain(movements)
    }

    /// Fetches the movement history, oldest first
    pub async fn movements(
        &self,
        id: CurrentAccountId,
    ) -> Result<Vec<CurrentAccountMovement>, DatabaseError> {
        fetch_movements(&self.pool, id).await
    }

    /// Updates the lifecycle status
    pub async fn set_status(
        &self,
        id: CurrentAccountId,
        status: AccountStatus,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE current_accounts SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(Uuid::from(id))
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("CurrentAccount", id));
        }
        Ok(())
    }
}

/// Fetches an account row, optionally taking a row lock
pub async fn fetch_account<'e>(
    executor: impl PgExecutor<'e>,
    id: CurrentAccountId,
    for_update: bool,
) -> Result<AccountRow, DatabaseError> {
    let base = r#"
        SELECT id, customer_id, currency, credit_limit, current_balance, status,
               created_at, updated_at
        FROM current_accounts
        WHERE id = $1
    "#;
    let query = if for_update {
        format!("{base} FOR UPDATE")
    } else {
        base.to_string()
    };

    sqlx::query_as::<_, AccountRow>(&query)
        .bind(Uuid::from(id))
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| DatabaseError::not_found("CurrentAccount", id))
}

/// Fetches the movement history for an account, oldest first
pub async fn fetch_movements<'e>(
    executor: impl PgExecutor<'e>,
    id: CurrentAccountId,
) -> Result<Vec<CurrentAccountMovement>, DatabaseError> {
    let rows = sqlx::query_as::<_, AccountMovementRow>(
        r#"
        SELECT id, account_id, movement_type_id, kind, direction, currency, amount,
               balance_before, balance_after, sale_id, reference, metadata, created_at
        FROM account_movements
        WHERE account_id = $1
        ORDER BY created_at, id
        "#,
    )
    .bind(Uuid::from(id))
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(AccountMovementRow::into_domain).collect()
}

/// Appends one movement row; movements are insert-only
pub async fn insert_movement<'e>(
    executor: impl PgExecutor<'e>,
    movement: &CurrentAccountMovement,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO account_movements
            (id, account_id, movement_type_id, kind, direction, currency, amount,
             balance_before, balance_after, sale_id, reference, metadata, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(Uuid::from(movement.id))
    .bind(Uuid::from(movement.account_id))
    .bind(Uuid::from(movement.movement_type_id))
    .bind(movement.kind.as_str())
    .bind(movement.direction.as_str())
    .bind(movement.amount.currency().code())
    .bind(movement.amount.amount())
    .bind(movement.balance_before.amount())
    .bind(movement.balance_after.amount())
    .bind(movement.sale_id.map(Uuid::from))
    .bind(movement.reference.as_deref())
    .bind(serde_json::to_value(&movement.metadata).unwrap_or(serde_json::Value::Null))
    .bind(movement.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Persists the running balance after movements were appended
pub async fn update_balance<'e>(
    executor: impl PgExecutor<'e>,
    account: &CurrentAccount,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        "UPDATE current_accounts SET current_balance = $2, updated_at = $3 WHERE id = $1",
    )
    .bind(Uuid::from(account.id))
    .bind(account.current_balance().amount())
    .bind(account.updated_at)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("CurrentAccount", account.id));
    }
    Ok(())
}
