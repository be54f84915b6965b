//! Movement type and payment method catalogs
//!
//! Both catalogs are reference data owned elsewhere; this module loads them
//! into their in-memory registries at startup and can seed the standard rows
//! into an empty database.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use domain_ledger::{MovementTypeRegistry, PaymentMethodCatalog};

use crate::error::DatabaseError;
use crate::rows::{MovementTypeRow, PaymentMethodRow};

/// Repository for the shared reference catalogs
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads every movement type into a registry
    pub async fn load_movement_types(&self) -> Result<MovementTypeRegistry, DatabaseError> {
        let rows = sqlx::query_as::<_, MovementTypeRow>(
            r#"
            SELECT id, kind, name, direction, affects_cash, affects_current_account,
                   is_surcharge, is_system, is_active
            FROM movement_types
            ORDER BY kind
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut registry = MovementTypeRegistry::new();
        for row in rows {
            let ty = row.into_domain()?;
            registry
                .register(ty)
                .map_err(|e| DatabaseError::CorruptRow(e.to_string()))?;
        }
        Ok(registry)
    }

    /// Loads every payment method into a catalog
    pub async fn load_payment_methods(&self) -> Result<PaymentMethodCatalog, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentMethodRow>(
            "SELECT id, name, kind, is_active FROM payment_methods ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut catalog = PaymentMethodCatalog::new();
        for row in rows {
            catalog.insert(row.into_domain());
        }
        Ok(catalog)
    }

    /// Seeds the standard catalogs into an empty database
    ///
    /// Existing rows win: kinds and names already present are left untouched,
    /// so re-running at startup is safe.
    pub async fn seed_standard(&self) -> Result<(), DatabaseError> {
        let types = MovementTypeRegistry::standard();
        for ty in types.iter() {
            sqlx::query(
                r#"
                INSERT INTO movement_types
                    (id, kind, name, direction, affects_cash, affects_current_account,
                     is_surcharge, is_system, is_active)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                ON CONFLICT (kind) DO NOTHING
                "#,
            )
            .bind(Uuid::from(ty.id))
            .bind(ty.kind.as_str())
            .bind(&ty.name)
            .bind(ty.direction.as_str())
            .bind(ty.affects_cash)
            .bind(ty.affects_current_account)
            .bind(ty.is_surcharge)
            .bind(ty.is_system)
            .bind(ty.is_active)
            .execute(&self.pool)
            .await?;
        }

        let methods = PaymentMethodCatalog::standard();
        for method in methods.iter() {
            sqlx::query(
                r#"
                INSERT INTO payment_methods (id, name, kind, is_active)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (name) DO NOTHING
                "#,
            )
            .bind(Uuid::from(method.id))
            .bind(&method.name)
            .bind(method.kind.as_str())
            .bind(method.is_active)
            .execute(&self.pool)
            .await?;
        }

        info!("reference catalogs seeded");
        Ok(())
    }
}
