//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the ledger and payments domains, built on SQLx
//! with runtime-checked queries.
//!
//! # Concurrency
//!
//! Movements are insert-only; running balances live on the account and
//! register rows. Every write path locks those rows `FOR UPDATE` in a fixed
//! order before appending, so the balance chain stays totally ordered per
//! account. Serialization failures and deadlocks roll back cleanly and are
//! retried with exponential backoff.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, CatalogRepository};
//!
//! let pool = create_pool_from_url("postgres://localhost/backoffice").await?;
//! let types = CatalogRepository::new(pool.clone()).load_movement_types().await?;
//! ```

pub mod error;
pub mod pool;
pub mod repositories;
pub mod retry;
pub mod rows;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{
    AccountRepository, CatalogRepository, PaymentService, RegisterRepository, SaleRepository,
    ServiceError,
};
pub use retry::with_retries;
