//! Liveness and readiness handlers.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use std::sync::Arc;

use super::super::state::AppState;

pub async fn pong() -> &'static str {
    "pong"
}

/// Health check endpoint
///
/// 200 with a timestamp when the database answers, 503 otherwise.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "ok",
                "timestamp_ms": Utc::now().timestamp_millis(),
            })),
        ),
        Err(err) => {
            tracing::error!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "unavailable"})),
            )
        }
    }
}
