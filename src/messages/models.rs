//! Message and tx-log state vocabulary.
//!
//! The canonical sets are fixed; no legacy values are accepted anywhere:
//! message: `{CREATED, SENDING, SUBMITTED, FAILED_TEMP, FAILED_PERM, REFUNDED}`,
//! tx-log: `{CREATED, PENDING, SUCCESS, REFUNDED, FAILED}`.

use chrono::{DateTime, Utc};
use std::fmt;

/// Delivery state of one message.
///
/// ```text
/// CREATED ──claim──▶ SENDING ──ok──▶ SUBMITTED  (terminal)
///                      │
///                      ├──perm──▶ FAILED_PERM ──refund-ok──▶ REFUNDED (terminal)
///                      │
///                      └──temp──▶ FAILED_TEMP ──claim──▶ SENDING (loop)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    Created,
    Sending,
    Submitted,
    FailedTemp,
    FailedPerm,
    Refunded,
}

impl MessageStatus {
    /// Terminal states admit no further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, MessageStatus::Submitted | MessageStatus::Refunded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Created => "CREATED",
            MessageStatus::Sending => "SENDING",
            MessageStatus::Submitted => "SUBMITTED",
            MessageStatus::FailedTemp => "FAILED_TEMP",
            MessageStatus::FailedPerm => "FAILED_PERM",
            MessageStatus::Refunded => "REFUNDED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(MessageStatus::Created),
            "SENDING" => Some(MessageStatus::Sending),
            "SUBMITTED" => Some(MessageStatus::Submitted),
            "FAILED_TEMP" => Some(MessageStatus::FailedTemp),
            "FAILED_PERM" => Some(MessageStatus::FailedPerm),
            "REFUNDED" => Some(MessageStatus::Refunded),
            _ => None,
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of one outbox row.
///
/// `CREATED` implies `published = false`; `PENDING` implies `published = true`.
/// `FAILED` means a refund is owed; `published` then tracks whether the refund
/// command has been emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxLogState {
    Created,
    Pending,
    Success,
    Refunded,
    Failed,
}

impl TxLogState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxLogState::Created => "CREATED",
            TxLogState::Pending => "PENDING",
            TxLogState::Success => "SUCCESS",
            TxLogState::Refunded => "REFUNDED",
            TxLogState::Failed => "FAILED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(TxLogState::Created),
            "PENDING" => Some(TxLogState::Pending),
            "SUCCESS" => Some(TxLogState::Success),
            "REFUNDED" => Some(TxLogState::Refunded),
            "FAILED" => Some(TxLogState::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for TxLogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: i64,
    pub client_message_id: String,
    pub from_msisdn: String,
    pub to_msisdn: String,
    pub text: String,
    pub status: MessageStatus,
    pub attempt_count: i32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub provider: Option<String>,
    pub provider_msg_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outbox row, one per message, created in the same transaction.
#[derive(Debug, Clone)]
pub struct TxLog {
    pub id: i64,
    pub message_id: i64,
    pub from_msisdn: String,
    pub amount: i64,
    pub state: TxLogState,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_status_roundtrip() {
        let statuses = [
            MessageStatus::Created,
            MessageStatus::Sending,
            MessageStatus::Submitted,
            MessageStatus::FailedTemp,
            MessageStatus::FailedPerm,
            MessageStatus::Refunded,
        ];
        for status in statuses {
            assert_eq!(MessageStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(MessageStatus::Submitted.is_terminal());
        assert!(MessageStatus::Refunded.is_terminal());

        assert!(!MessageStatus::Created.is_terminal());
        assert!(!MessageStatus::Sending.is_terminal());
        assert!(!MessageStatus::FailedTemp.is_terminal());
        assert!(!MessageStatus::FailedPerm.is_terminal());
    }

    #[test]
    fn test_tx_log_state_roundtrip() {
        let states = [
            TxLogState::Created,
            TxLogState::Pending,
            TxLogState::Success,
            TxLogState::Refunded,
            TxLogState::Failed,
        ];
        for state in states {
            assert_eq!(TxLogState::from_str(state.as_str()), Some(state));
        }
    }

    #[test]
    fn test_legacy_vocabulary_rejected() {
        assert_eq!(TxLogState::from_str("QUEUED"), None);
        assert_eq!(MessageStatus::from_str("QUEUED"), None);
    }
}
