use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("user already exists")]
    UserExisted,

    #[error("user not found")]
    UserNotFound,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("ledger operation failed")]
    OperationFailed(#[source] sqlx::Error),
}

impl LedgerError {
    /// Stable code surfaced in API error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::UserExisted => "USER_EXISTED",
            LedgerError::UserNotFound => "USER_NOT_FOUND",
            LedgerError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            LedgerError::OperationFailed(_) => "OPERATION_FAILED",
        }
    }
}
