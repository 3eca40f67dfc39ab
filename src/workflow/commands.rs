//! Command payloads crossing the workflow boundaries. The serializable ones
//! are the queue wire format.

use serde::{Deserialize, Serialize};

pub struct CreateMessageCommand {
    pub client_message_id: String,
    pub from_msisdn: String,
    pub to_msisdn: String,
    pub text: String,
}

#[derive(Debug)]
pub struct CreateMessageResponse {
    pub message_id: i64,
}

/// Payload on the `sms.send` queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageCommand {
    pub message_id: i64,
    pub from_msisdn: String,
    pub to_msisdn: String,
    pub text: String,
}

/// Payload on the `sms.refund` queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRefundCommand {
    pub tx_log_id: i64,
    pub message_id: i64,
    pub from_msisdn: String,
    pub amount: i64,
}

pub struct GetMessagesQuery {
    pub user_id: String,
    pub limit: i64,
    pub offset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_command_wire_format() {
        let cmd = SendMessageCommand {
            message_id: 42,
            from_msisdn: "09121234567".to_string(),
            to_msisdn: "09129999999".to_string(),
            text: "hi".to_string(),
        };

        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["message_id"], 42);
        assert_eq!(json["from_msisdn"], "09121234567");
        assert_eq!(json["to_msisdn"], "09129999999");
        assert_eq!(json["text"], "hi");
    }

    #[test]
    fn test_refund_command_wire_format() {
        let cmd = ProcessRefundCommand {
            tx_log_id: 7,
            message_id: 42,
            from_msisdn: "09121234567".to_string(),
            amount: 1,
        };

        let bytes = serde_json::to_vec(&cmd).unwrap();
        let back: ProcessRefundCommand = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back.tx_log_id, 7);
        assert_eq!(back.message_id, 42);
        assert_eq!(back.amount, 1);
    }
}
