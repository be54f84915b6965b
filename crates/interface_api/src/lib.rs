//! HTTP API layer
//!
//! REST surface over the ledger and payment engine using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: request handlers for accounts, registers and payments
//! - **Middleware**: audit logging and acting-user extraction
//! - **DTOs**: request/response data transfer objects
//! - **Error handling**: consistent error responses
//!
//! Identity is not established here: the upstream gateway authenticates and
//! forwards the acting user in the `X-User-Id` header.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config, types, methods);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_ledger::{MovementTypeRegistry, PaymentMethodCatalog};
use infra_db::{AccountRepository, PaymentService, RegisterRepository, SaleRepository};

use crate::config::ApiConfig;
use crate::handlers::{accounts, health, payments, registers};
use crate::middleware::audit_middleware;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub types: Arc<MovementTypeRegistry>,
    pub methods: Arc<PaymentMethodCatalog>,
    pub payments: PaymentService,
    pub accounts: AccountRepository,
    pub registers: RegisterRepository,
    pub sales: SaleRepository,
}

/// Creates the main API router
pub fn create_router(
    pool: PgPool,
    config: ApiConfig,
    types: Arc<MovementTypeRegistry>,
    methods: Arc<PaymentMethodCatalog>,
) -> Router {
    let state = AppState {
        payments: PaymentService::new(pool.clone(), types.clone(), methods.clone()),
        accounts: AccountRepository::new(pool.clone()),
        registers: RegisterRepository::new(pool.clone()),
        sales: SaleRepository::new(pool.clone()),
        pool,
        config,
        types,
        methods,
    };

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Account routes
    let account_routes = Router::new()
        .route("/", post(accounts::create_account))
        .route("/:id", get(accounts::get_account))
        .route("/:id/status", patch(accounts::update_account_status))
        .route("/:id/movements", get(accounts::list_movements))
        .route("/:id/favor-credit", get(accounts::get_favor_credit))
        .route("/:id/sales", post(accounts::create_sale))
        .route("/:id/pending-sales", get(accounts::list_pending_sales))
        .route("/:id/charges", get(accounts::list_open_charges))
        .route("/:id/charges", post(accounts::create_charge));

    // Register routes
    let register_routes = Router::new()
        .route("/", post(registers::open_register))
        .route("/:id", get(registers::get_register))
        .route("/:id/totals", get(registers::get_register_totals))
        .route("/:id/close", post(registers::close_register));

    // Payment routes
    let payment_routes = Router::new().route("/", post(payments::execute_payment));

    let api_routes = Router::new()
        .nest("/accounts", account_routes)
        .nest("/registers", register_routes)
        .nest("/payments", payment_routes)
        .layer(axum_middleware::from_fn(audit_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
