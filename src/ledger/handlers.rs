//! Ledger HTTP surface.
//!
//! Success envelope: `{code: "success", message, result: {user_balance,
//! transaction_id, transaction_time}}`. Error envelope: `{code, message}` with
//! the HTTP status owned here, never by the service layer.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use super::error::LedgerError;
use super::models::UserBalance;
use super::service::BalanceResult;
use super::LedgerState;

pub const USER_ID_LEN: usize = 11;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub user_id: String,
    pub initial_balance: i64,
    pub idempotency_key: String,
}

#[derive(Debug, Deserialize)]
pub struct GetBalanceRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBalanceRequest {
    pub user_id: String,
    pub amount: i64,
    pub idempotency_key: String,
}

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<BalanceResultBody>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResultBody {
    pub user_balance: UserBalanceBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct UserBalanceBody {
    pub user_id: String,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserBalance> for UserBalanceBody {
    fn from(ub: UserBalance) -> Self {
        Self {
            user_id: ub.user_id,
            balance: ub.balance,
            created_at: ub.created_at,
            updated_at: ub.updated_at,
        }
    }
}

fn success(message: &str, result: BalanceResultBody) -> Response {
    (
        StatusCode::OK,
        Json(Envelope {
            code: "success".to_string(),
            message: message.to_string(),
            result: Some(result),
        }),
    )
        .into_response()
}

fn balance_body(result: BalanceResult) -> BalanceResultBody {
    BalanceResultBody {
        user_balance: result.user_balance.into(),
        transaction_id: Some(result.transaction_id),
        transaction_time: Some(result.transaction_time),
    }
}

/// Ledger API error with the code→status mapping in one place.
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match err {
            LedgerError::UserNotFound => StatusCode::NOT_FOUND,
            LedgerError::UserExisted | LedgerError::InsufficientBalance => StatusCode::CONFLICT,
            LedgerError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

fn validate_user_id(user_id: &str) -> Result<(), ApiError> {
    if user_id.len() != USER_ID_LEN {
        return Err(ApiError::validation(format!(
            "user_id must be exactly {} characters",
            USER_ID_LEN
        )));
    }
    Ok(())
}

fn validate_mutation(user_id: &str, amount: i64, idempotency_key: &str) -> Result<(), ApiError> {
    validate_user_id(user_id)?;
    if amount <= 0 {
        return Err(ApiError::validation("amount must be positive"));
    }
    if idempotency_key.is_empty() {
        return Err(ApiError::validation("idempotency_key is required"));
    }
    Ok(())
}

pub async fn pong() -> &'static str {
    "pong"
}

pub async fn health_check(State(state): State<Arc<LedgerState>>) -> Response {
    match state.db.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "ok", "timestamp_ms": Utc::now().timestamp_millis()})),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"status": "unavailable"})),
            )
                .into_response()
        }
    }
}

pub async fn create_user(
    State(state): State<Arc<LedgerState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Response, ApiError> {
    validate_user_id(&req.user_id)?;
    if req.initial_balance < 0 {
        return Err(ApiError::validation("initial_balance must not be negative"));
    }
    if req.idempotency_key.is_empty() {
        return Err(ApiError::validation("idempotency_key is required"));
    }

    let result = state
        .service
        .create_user(&req.user_id, req.initial_balance, &req.idempotency_key)
        .await?;

    Ok(success("user balance created successfully", balance_body(result)))
}

pub async fn get_balance(
    State(state): State<Arc<LedgerState>>,
    Json(req): Json<GetBalanceRequest>,
) -> Result<Response, ApiError> {
    validate_user_id(&req.user_id)?;

    let ub = state.service.get_balance(&req.user_id).await?;

    Ok(success(
        "user balance retrieved successfully",
        BalanceResultBody {
            user_balance: ub.into(),
            transaction_id: None,
            transaction_time: None,
        },
    ))
}

pub async fn increase_balance(
    State(state): State<Arc<LedgerState>>,
    Json(req): Json<UpdateBalanceRequest>,
) -> Result<Response, ApiError> {
    validate_mutation(&req.user_id, req.amount, &req.idempotency_key)?;

    let result = state
        .service
        .increase_balance(&req.user_id, req.amount, &req.idempotency_key)
        .await?;

    Ok(success("user balance updated successfully", balance_body(result)))
}

pub async fn decrease_balance(
    State(state): State<Arc<LedgerState>>,
    Json(req): Json<UpdateBalanceRequest>,
) -> Result<Response, ApiError> {
    validate_mutation(&req.user_id, req.amount, &req.idempotency_key)?;

    let result = state
        .service
        .decrease_balance(&req.user_id, req.amount, &req.idempotency_key)
        .await?;

    Ok(success("user balance updated successfully", balance_body(result)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_id_length() {
        assert!(validate_user_id("09121234567").is_ok());
        assert!(validate_user_id("0912123456").is_err());
        assert!(validate_user_id("").is_err());
    }

    #[test]
    fn test_validate_mutation() {
        assert!(validate_mutation("09121234567", 1, "k").is_ok());
        assert!(validate_mutation("09121234567", 0, "k").is_err());
        assert!(validate_mutation("09121234567", -5, "k").is_err());
        assert!(validate_mutation("09121234567", 1, "").is_err());
    }

    #[test]
    fn test_error_status_mapping() {
        let err: ApiError = LedgerError::UserNotFound.into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "USER_NOT_FOUND");

        let err: ApiError = LedgerError::InsufficientBalance.into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError = LedgerError::UserExisted.into();
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err: ApiError = LedgerError::OperationFailed(sqlx::Error::RowNotFound).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
