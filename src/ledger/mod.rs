//! Balance ledger service.
//!
//! Owns user balances and an append-only transaction journal. Every mutation
//! is idempotent on `(tx_type, idempotency_key)`: a retried request replays
//! the original journal row instead of applying a second balance change.

pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub use error::LedgerError;
pub use models::{LedgerTransaction, TxType, UserBalance};
pub use service::{BalanceResult, LedgerService};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::shutdown::ShutdownSignal;

/// Shared state for the ledger HTTP surface.
pub struct LedgerState {
    pub service: LedgerService,
    pub db: Arc<crate::db::Database>,
}

/// Run the ledger HTTP server until shutdown is requested.
pub async fn run_server(
    host: &str,
    port: u16,
    state: Arc<LedgerState>,
    shutdown: ShutdownSignal,
) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/ping", get(handlers::pong))
        .route("/health", get(handlers::health_check))
        .route("/api/v1/users", post(handlers::create_user))
        .route("/api/v1/users/balance", post(handlers::get_balance))
        .route("/api/v1/user/increase/balance", post(handlers::increase_balance))
        .route("/api/v1/user/decrease/balance", post(handlers::decrease_balance))
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Ledger listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.requested().await })
        .await?;

    Ok(())
}
