use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid recipient number")]
    InvalidNumber,

    #[error("provider request timed out")]
    Timeout,

    #[error("provider network error: {0}")]
    Network(String),

    #[error("provider server error: HTTP {0}")]
    Server(u16),

    #[error("send cancelled by shutdown")]
    Cancelled,
}

impl ProviderError {
    /// Stable reason code recorded on the tx-log row.
    pub fn code(&self) -> &'static str {
        match self {
            ProviderError::InvalidNumber => "INVALID_NUMBER",
            ProviderError::Timeout => "TIMEOUT",
            ProviderError::Network(_) => "NETWORK_ERROR",
            ProviderError::Server(_) => "SERVER_ERROR",
            ProviderError::Cancelled => "CANCELLED",
        }
    }

    /// Permanent failures are never retried and trigger the refund flow.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ProviderError::InvalidNumber)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invalid_number_is_permanent() {
        assert!(ProviderError::InvalidNumber.is_permanent());

        assert!(!ProviderError::Timeout.is_permanent());
        assert!(!ProviderError::Network("reset".into()).is_permanent());
        assert!(!ProviderError::Server(503).is_permanent());
        assert!(!ProviderError::Cancelled.is_permanent());
    }

    #[test]
    fn test_codes() {
        assert_eq!(ProviderError::InvalidNumber.code(), "INVALID_NUMBER");
        assert_eq!(ProviderError::Timeout.code(), "TIMEOUT");
        assert_eq!(ProviderError::Network("x".into()).code(), "NETWORK_ERROR");
        assert_eq!(ProviderError::Server(500).code(), "SERVER_ERROR");
    }
}
