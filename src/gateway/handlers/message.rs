//! Message intake and listing handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{info, warn};

use super::super::state::AppState;
use super::super::types::{
    ApiError, GetMessagesRequest, GetMessagesResponse, MSISDN_LEN, MessageBody,
    SendMessageRequest, SendMessageResponse,
};
use crate::messages::MessageStatus;
use crate::workflow::{CreateMessageCommand, GetMessagesQuery};

const DEFAULT_PAGE_LIMIT: i64 = 20;

fn validate_send_request(req: &SendMessageRequest) -> Result<(), ApiError> {
    if req.from.len() != MSISDN_LEN {
        return Err(ApiError::invalid_request_body(format!(
            "from must be exactly {} characters",
            MSISDN_LEN
        )));
    }
    if req.to.len() != MSISDN_LEN {
        return Err(ApiError::invalid_request_body(format!(
            "to must be exactly {} characters",
            MSISDN_LEN
        )));
    }
    if req.message_id.is_empty() {
        return Err(ApiError::invalid_request_body("message_id is required"));
    }
    if req.text.is_empty() {
        return Err(ApiError::invalid_request_body("text is required"));
    }
    Ok(())
}

/// Submit a message for delivery.
///
/// Charges the sender's balance, persists the message with its outbox row,
/// and returns immediately; delivery happens asynchronously.
#[utoipa::path(
    post,
    path = "/v1/message",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message accepted", body = SendMessageResponse),
        (status = 400, description = "Malformed request body"),
        (status = 404, description = "Unknown sender account"),
        (status = 409, description = "Duplicate message or insufficient balance"),
        (status = 500, description = "Internal error")
    ),
    tag = "Messages"
)]
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<SendMessageResponse>), ApiError> {
    validate_send_request(&request)?;

    let cmd = CreateMessageCommand {
        client_message_id: request.message_id.clone(),
        from_msisdn: request.from.clone(),
        to_msisdn: request.to.clone(),
        text: request.text,
    };

    let resp = state.intake.create_message(&cmd).await.map_err(|err| {
        warn!(
            code = err.code(),
            from = %request.from,
            to = %request.to,
            message_id = %request.message_id,
            "Failed to create message"
        );
        ApiError::from(err)
    })?;

    info!(
        from = %request.from,
        to = %request.to,
        message_id = %request.message_id,
        "Message received"
    );

    Ok((
        StatusCode::CREATED,
        Json(SendMessageResponse {
            status: MessageStatus::Created.as_str().to_string(),
            message_id: resp.message_id,
        }),
    ))
}

/// List a user's messages, newest first.
#[utoipa::path(
    get,
    path = "/v1/messages",
    params(GetMessagesRequest),
    responses(
        (status = 200, description = "Messages for the user", body = GetMessagesResponse),
        (status = 400, description = "Malformed query"),
        (status = 500, description = "Internal error")
    ),
    tag = "Messages"
)]
pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    Query(request): Query<GetMessagesRequest>,
) -> Result<Json<GetMessagesResponse>, ApiError> {
    if request.user_id.is_empty() {
        return Err(ApiError::invalid_request_body("user_id is required"));
    }

    let query = GetMessagesQuery {
        user_id: request.user_id,
        limit: request.limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, 100),
        offset: request.offset.unwrap_or(0).max(0),
    };

    let messages = state.intake.get_messages(&query).await.map_err(|err| {
        warn!(code = err.code(), user_id = %query.user_id, "Failed to get messages");
        ApiError::from(err)
    })?;

    Ok(Json(GetMessagesResponse {
        messages: messages.into_iter().map(MessageBody::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SendMessageRequest {
        SendMessageRequest {
            from: "09121234567".to_string(),
            to: "09129999999".to_string(),
            text: "hi".to_string(),
            message_id: "m1".to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_request() {
        assert!(validate_send_request(&request()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_msisdn() {
        let mut req = request();
        req.from = "0912".to_string();
        assert!(validate_send_request(&req).is_err());

        let mut req = request();
        req.to = "091299999990".to_string();
        assert!(validate_send_request(&req).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut req = request();
        req.message_id = String::new();
        assert!(validate_send_request(&req).is_err());

        let mut req = request();
        req.text = String::new();
        assert!(validate_send_request(&req).is_err());
    }
}
