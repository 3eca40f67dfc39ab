//! Gateway API types and the error-code → HTTP-status mapping.

use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::messages::Message;
use crate::payment::PaymentError;
use crate::workflow::WorkflowError;

pub const MSISDN_LEN: usize = 11;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// Sender MSISDN, also the paying account.
    #[schema(example = "09121234567")]
    pub from: String,
    /// Recipient MSISDN.
    #[schema(example = "09129999999")]
    pub to: String,
    pub text: String,
    /// Client-chosen dedup key, unique per sender.
    #[schema(example = "m1")]
    pub message_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SendMessageResponse {
    #[schema(example = "CREATED")]
    pub status: String,
    pub message_id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GetMessagesRequest {
    pub user_id: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageBody {
    pub id: i64,
    pub client_message_id: String,
    pub from_msisdn: String,
    pub to_msisdn: String,
    pub text: String,
    pub status: String,
    pub attempt_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_msg_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageBody {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            client_message_id: msg.client_message_id,
            from_msisdn: msg.from_msisdn,
            to_msisdn: msg.to_msisdn,
            text: msg.text,
            status: msg.status.as_str().to_string(),
            attempt_count: msg.attempt_count,
            provider: msg.provider,
            provider_msg_id: msg.provider_msg_id,
            created_at: msg.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GetMessagesResponse {
    pub messages: Vec<MessageBody>,
}

/// Error envelope `{code, message}` with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn invalid_request_body(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_REQUEST_BODY", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(serde_json::json!({
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        let status = match &err {
            WorkflowError::DuplicateMessage => StatusCode::CONFLICT,
            WorkflowError::Payment(PaymentError::UserNotFound) => StatusCode::NOT_FOUND,
            WorkflowError::Payment(PaymentError::InsufficientBalance) => StatusCode::CONFLICT,
            WorkflowError::Payment(PaymentError::ValidationFailed) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_error_status_mapping() {
        let err: ApiError = WorkflowError::DuplicateMessage.into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "DUPLICATE_MESSAGE");

        let err: ApiError = WorkflowError::Payment(PaymentError::UserNotFound).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, "USER_NOT_FOUND");

        let err: ApiError = WorkflowError::Payment(PaymentError::InsufficientBalance).into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.code, "INSUFFICIENT_BALANCE");

        let err: ApiError = WorkflowError::Database(sqlx::Error::RowNotFound).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, "DATABASE_ERROR");
    }

    #[test]
    fn test_message_body_from_model() {
        let msg = Message {
            id: 1,
            client_message_id: "m1".to_string(),
            from_msisdn: "09121234567".to_string(),
            to_msisdn: "09129999999".to_string(),
            text: "hi".to_string(),
            status: crate::messages::MessageStatus::Submitted,
            attempt_count: 2,
            last_attempt_at: None,
            provider: Some("acme".to_string()),
            provider_msg_id: Some("p-1".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let body = MessageBody::from(msg);
        assert_eq!(body.status, "SUBMITTED");
        assert_eq!(body.attempt_count, 2);
        assert_eq!(body.provider.as_deref(), Some("acme"));
    }
}
