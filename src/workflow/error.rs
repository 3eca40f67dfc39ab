use thiserror::Error;

use crate::messages::RepoError;
use crate::payment::PaymentError;
use crate::provider::ProviderError;

/// Gateway workflow error taxonomy.
///
/// Every variant carries a stable string code; [`WorkflowError::is_retriable`]
/// is the consumer-side disposition used by the broker adapter.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("duplicate message")]
    DuplicateMessage,

    #[error("message not found")]
    MessageNotFound,

    #[error("message is being processed by another consumer")]
    MessageBeingProcessed,

    #[error("message already processed")]
    MessageAlreadyProcessed,

    #[error("unknown message status: {0}")]
    UnknownMessageStatus(String),

    #[error("transaction log not found")]
    TxLogNotFound,

    #[error("transaction log is not refundable")]
    RefundInvalidState,

    #[error("refund already processed")]
    RefundAlreadyProcessed,

    #[error("unknown transaction log state: {0}")]
    UnknownTxState(String),

    #[error("database error")]
    Database(#[source] sqlx::Error),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl WorkflowError {
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::DuplicateMessage => "DUPLICATE_MESSAGE",
            WorkflowError::MessageNotFound => "MESSAGE_NOT_FOUND",
            WorkflowError::MessageBeingProcessed => "MESSAGE_BEING_PROCESSED",
            WorkflowError::MessageAlreadyProcessed => "MESSAGE_ALREADY_PROCESSED",
            WorkflowError::UnknownMessageStatus(_) => "UNKNOWN_MESSAGE_STATUS",
            WorkflowError::TxLogNotFound => "TX_LOG_NOT_FOUND",
            WorkflowError::RefundInvalidState => "REFUND_INVALID_STATE",
            WorkflowError::RefundAlreadyProcessed => "REFUND_ALREADY_PROCESSED",
            WorkflowError::UnknownTxState(_) => "UNKNOWN_TX_STATE",
            WorkflowError::Database(_) => "DATABASE_ERROR",
            WorkflowError::Payment(err) => err.code(),
            WorkflowError::Provider(_) => "PROVIDER_ERROR",
        }
    }

    /// Whether a consumer hitting this error should nack-with-requeue.
    pub fn is_retriable(&self) -> bool {
        match self {
            WorkflowError::Database(_) => true,
            WorkflowError::Payment(err) => err.is_retriable(),
            WorkflowError::Provider(err) => !err.is_permanent(),
            _ => false,
        }
    }
}

impl From<RepoError> for WorkflowError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UnknownStatus(s) => WorkflowError::UnknownMessageStatus(s),
            RepoError::UnknownState(s) => WorkflowError::UnknownTxState(s),
            RepoError::Db(e) => WorkflowError::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::client::ClientError;

    #[test]
    fn test_codes() {
        assert_eq!(WorkflowError::DuplicateMessage.code(), "DUPLICATE_MESSAGE");
        assert_eq!(WorkflowError::MessageBeingProcessed.code(), "MESSAGE_BEING_PROCESSED");
        assert_eq!(WorkflowError::RefundAlreadyProcessed.code(), "REFUND_ALREADY_PROCESSED");
        assert_eq!(
            WorkflowError::Database(sqlx::Error::RowNotFound).code(),
            "DATABASE_ERROR"
        );
        assert_eq!(
            WorkflowError::Payment(PaymentError::InsufficientBalance).code(),
            "INSUFFICIENT_BALANCE"
        );
    }

    #[test]
    fn test_retriable_classification() {
        assert!(WorkflowError::Database(sqlx::Error::RowNotFound).is_retriable());
        assert!(
            WorkflowError::Payment(PaymentError::RefundTimeout(ClientError::Timeout))
                .is_retriable()
        );
        assert!(WorkflowError::Provider(ProviderError::Timeout).is_retriable());

        assert!(!WorkflowError::Provider(ProviderError::InvalidNumber).is_retriable());
        assert!(!WorkflowError::Payment(PaymentError::UserNotFound).is_retriable());
        assert!(!WorkflowError::DuplicateMessage.is_retriable());
        assert!(!WorkflowError::MessageAlreadyProcessed.is_retriable());
    }

    #[test]
    fn test_repo_error_mapping() {
        let err: WorkflowError = RepoError::UnknownStatus("QUEUED".to_string()).into();
        assert_eq!(err.code(), "UNKNOWN_MESSAGE_STATUS");

        let err: WorkflowError = RepoError::UnknownState("QUEUED".to_string()).into();
        assert_eq!(err.code(), "UNKNOWN_TX_STATE");

        let err: WorkflowError = RepoError::Db(sqlx::Error::RowNotFound).into();
        assert!(err.is_retriable());
    }
}
