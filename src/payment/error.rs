use thiserror::Error;

use super::client::ClientError;

/// Ledger call outcome after retries, as the workflow sees it.
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("user not found")]
    UserNotFound,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("validation rejected by ledger")]
    ValidationFailed,

    #[error("charge attempts timed out")]
    ChargeTimeout(#[source] ClientError),

    #[error("refund attempts timed out")]
    RefundTimeout(#[source] ClientError),

    #[error("payment service unavailable")]
    ServiceError(#[source] ClientError),
}

impl PaymentError {
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::UserNotFound => "USER_NOT_FOUND",
            PaymentError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            PaymentError::ValidationFailed => "VALIDATION_FAILED",
            PaymentError::ChargeTimeout(_) => "CHARGE_TIMEOUT",
            PaymentError::RefundTimeout(_) => "REFUND_TIMEOUT",
            PaymentError::ServiceError(_) => "PAYMENT_SERVICE_ERROR",
        }
    }

    /// Whether a consumer should requeue the job that hit this error.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            PaymentError::ChargeTimeout(_)
                | PaymentError::RefundTimeout(_)
                | PaymentError::ServiceError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(PaymentError::UserNotFound.code(), "USER_NOT_FOUND");
        assert_eq!(PaymentError::InsufficientBalance.code(), "INSUFFICIENT_BALANCE");
        assert_eq!(
            PaymentError::ChargeTimeout(ClientError::Timeout).code(),
            "CHARGE_TIMEOUT"
        );
        assert_eq!(
            PaymentError::RefundTimeout(ClientError::Timeout).code(),
            "REFUND_TIMEOUT"
        );
        assert_eq!(
            PaymentError::ServiceError(ClientError::Server(500)).code(),
            "PAYMENT_SERVICE_ERROR"
        );
    }

    #[test]
    fn test_retriable_classification() {
        assert!(PaymentError::ChargeTimeout(ClientError::Timeout).is_retriable());
        assert!(PaymentError::ServiceError(ClientError::Server(503)).is_retriable());

        assert!(!PaymentError::UserNotFound.is_retriable());
        assert!(!PaymentError::InsufficientBalance.is_retriable());
        assert!(!PaymentError::ValidationFailed.is_retriable());
    }
}
