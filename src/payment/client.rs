//! HTTP client for the ledger service.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::PaymentConfig;

const INCREASE_BALANCE_ENDPOINT: &str = "/api/v1/user/increase/balance";
const DECREASE_BALANCE_ENDPOINT: &str = "/api/v1/user/decrease/balance";

/// One balance mutation: charge (decrease) or refund (increase).
#[derive(Debug, Clone, Serialize)]
pub struct BalanceChangeRequest {
    pub user_id: String,
    pub amount: i64,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceChangeResponse {
    pub code: String,
    pub message: String,
    pub result: Option<BalanceChangeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BalanceChangeResult {
    pub user_balance: UserBalanceBody,
    pub transaction_id: i64,
    pub transaction_time: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserBalanceBody {
    pub user_id: String,
    pub balance: i64,
}

/// Classified outcome of one ledger call.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("user not found")]
    UserNotFound,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("validation failed")]
    ValidationFailed,

    #[error("ledger request timed out")]
    Timeout,

    #[error("ledger server error: HTTP {0}")]
    Server(u16),

    #[error("ledger transport error: {0}")]
    Transport(String),

    #[error("failed to decode ledger response")]
    Decode(#[source] reqwest::Error),
}

impl ClientError {
    /// Terminal errors are never retried by the payment service.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ClientError::UserNotFound
                | ClientError::InsufficientBalance
                | ClientError::ValidationFailed
        )
    }

    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => ClientError::UserNotFound,
            StatusCode::CONFLICT => ClientError::InsufficientBalance,
            StatusCode::UNPROCESSABLE_ENTITY => ClientError::ValidationFailed,
            other => ClientError::Server(other.as_u16()),
        }
    }
}

/// Seam between the retry wrapper and the wire. The HTTP implementation is
/// [`LedgerClient`]; tests substitute mocks.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Decrease the user's balance.
    async fn charge(&self, req: &BalanceChangeRequest) -> Result<BalanceChangeResponse, ClientError>;
    /// Increase the user's balance.
    async fn refund(&self, req: &BalanceChangeRequest) -> Result<BalanceChangeResponse, ClientError>;
}

pub struct LedgerClient {
    client: Client,
    base_url: String,
}

impl LedgerClient {
    pub fn new(config: &PaymentConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_balance_change(
        &self,
        endpoint: &str,
        req: &BalanceChangeRequest,
    ) -> Result<BalanceChangeResponse, ClientError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let response = self.client.post(&url).json(req).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status == StatusCode::OK {
            return response.json().await.map_err(ClientError::Decode);
        }

        Err(ClientError::from_status(status))
    }
}

#[async_trait]
impl LedgerApi for LedgerClient {
    async fn charge(&self, req: &BalanceChangeRequest) -> Result<BalanceChangeResponse, ClientError> {
        self.post_balance_change(DECREASE_BALANCE_ENDPOINT, req).await
    }

    async fn refund(&self, req: &BalanceChangeRequest) -> Result<BalanceChangeResponse, ClientError> {
        self.post_balance_change(INCREASE_BALANCE_ENDPOINT, req).await
    }
}
