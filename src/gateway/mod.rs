//! Gateway HTTP surface: message intake and listing.

pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::shutdown::ShutdownSignal;

/// Run the gateway HTTP server until shutdown is requested.
pub async fn run_server(
    host: &str,
    port: u16,
    state: Arc<AppState>,
    shutdown: ShutdownSignal,
) -> anyhow::Result<()> {
    let app = Router::new()
        .route("/ping", get(handlers::pong))
        .route("/health", get(handlers::health_check))
        .route("/v1/message", post(handlers::create_message))
        .route("/v1/messages", get(handlers::get_messages))
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.requested().await })
        .await?;

    Ok(())
}
