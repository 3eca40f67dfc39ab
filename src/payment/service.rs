//! Bounded-retry wrapper over the ledger API.
//!
//! Terminal classifications (user missing, insufficient balance, validation)
//! abort immediately; everything else is retried up to the configured bound.
//! When the last error was a timeout the caller sees CHARGE_TIMEOUT /
//! REFUND_TIMEOUT, otherwise PAYMENT_SERVICE_ERROR.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::client::{BalanceChangeRequest, ClientError, LedgerApi};
use super::error::PaymentError;

pub struct PaymentService {
    api: Arc<dyn LedgerApi>,
    max_retries: u32,
}

impl PaymentService {
    pub fn new(api: Arc<dyn LedgerApi>, max_retries: u32) -> Self {
        Self { api, max_retries }
    }

    pub async fn charge(&self, request: &BalanceChangeRequest) -> Result<(), PaymentError> {
        let mut last_err = None;

        for attempt in 1..=self.max_retries {
            match self.api.charge(request).await {
                Ok(resp) => {
                    info!(
                        user_id = %request.user_id,
                        attempt,
                        idempotency_key = %request.idempotency_key,
                        transaction_id = resp.result.as_ref().map(|r| r.transaction_id),
                        "User charged"
                    );
                    return Ok(());
                }
                Err(ClientError::UserNotFound) => {
                    warn!(user_id = %request.user_id, attempt, "Charge rejected: user not found");
                    return Err(PaymentError::UserNotFound);
                }
                Err(ClientError::InsufficientBalance) => {
                    warn!(user_id = %request.user_id, attempt, "Charge rejected: insufficient balance");
                    return Err(PaymentError::InsufficientBalance);
                }
                Err(ClientError::ValidationFailed) => {
                    warn!(user_id = %request.user_id, attempt, "Charge rejected: validation failed");
                    return Err(PaymentError::ValidationFailed);
                }
                Err(err) => {
                    warn!(user_id = %request.user_id, attempt, error = %err, "Charge attempt failed");
                    last_err = Some(err);
                }
            }
        }

        let last_err = last_err.expect("retry loop ran at least once");
        if matches!(last_err, ClientError::Timeout) {
            error!(
                user_id = %request.user_id,
                max_retries = self.max_retries,
                "Charge attempts timed out"
            );
            return Err(PaymentError::ChargeTimeout(last_err));
        }

        error!(
            user_id = %request.user_id,
            max_retries = self.max_retries,
            error = %last_err,
            "Payment service unavailable after all charge retries"
        );
        Err(PaymentError::ServiceError(last_err))
    }

    pub async fn refund(&self, request: &BalanceChangeRequest) -> Result<(), PaymentError> {
        let mut last_err = None;

        for attempt in 1..=self.max_retries {
            match self.api.refund(request).await {
                Ok(resp) => {
                    info!(
                        user_id = %request.user_id,
                        attempt,
                        idempotency_key = %request.idempotency_key,
                        transaction_id = resp.result.as_ref().map(|r| r.transaction_id),
                        "User refunded"
                    );
                    return Ok(());
                }
                Err(ClientError::UserNotFound) => {
                    error!(user_id = %request.user_id, attempt, "Refund rejected: user not found");
                    return Err(PaymentError::UserNotFound);
                }
                Err(err) => {
                    warn!(user_id = %request.user_id, attempt, error = %err, "Refund attempt failed");
                    last_err = Some(err);
                }
            }
        }

        let last_err = last_err.expect("retry loop ran at least once");
        if matches!(last_err, ClientError::Timeout) {
            error!(
                user_id = %request.user_id,
                max_retries = self.max_retries,
                "Refund attempts timed out"
            );
            return Err(PaymentError::RefundTimeout(last_err));
        }

        error!(
            user_id = %request.user_id,
            max_retries = self.max_retries,
            error = %last_err,
            "Payment service unavailable after all refund retries"
        );
        Err(PaymentError::ServiceError(last_err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::client::BalanceChangeResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted ledger double: pops one outcome per call.
    struct MockLedger {
        charges: Mutex<Vec<Result<(), ClientError>>>,
        refunds: Mutex<Vec<Result<(), ClientError>>>,
        charge_calls: AtomicUsize,
        refund_calls: AtomicUsize,
    }

    impl MockLedger {
        fn new(
            charges: Vec<Result<(), ClientError>>,
            refunds: Vec<Result<(), ClientError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                charges: Mutex::new(charges),
                refunds: Mutex::new(refunds),
                charge_calls: AtomicUsize::new(0),
                refund_calls: AtomicUsize::new(0),
            })
        }

        fn ok_response() -> BalanceChangeResponse {
            BalanceChangeResponse {
                code: "success".to_string(),
                message: "user balance updated successfully".to_string(),
                result: None,
            }
        }
    }

    #[async_trait]
    impl LedgerApi for MockLedger {
        async fn charge(
            &self,
            _req: &BalanceChangeRequest,
        ) -> Result<BalanceChangeResponse, ClientError> {
            self.charge_calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.charges.lock().unwrap();
            match script.remove(0) {
                Ok(()) => Ok(Self::ok_response()),
                Err(e) => Err(e),
            }
        }

        async fn refund(
            &self,
            _req: &BalanceChangeRequest,
        ) -> Result<BalanceChangeResponse, ClientError> {
            self.refund_calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.refunds.lock().unwrap();
            match script.remove(0) {
                Ok(()) => Ok(Self::ok_response()),
                Err(e) => Err(e),
            }
        }
    }

    fn request() -> BalanceChangeRequest {
        BalanceChangeRequest {
            user_id: "09121234567".to_string(),
            amount: 1,
            idempotency_key: "charge-09121234567-m1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_charge_retries_then_succeeds() {
        let mock = MockLedger::new(
            vec![Err(ClientError::Server(503)), Err(ClientError::Timeout), Ok(())],
            vec![],
        );
        let svc = PaymentService::new(mock.clone(), 3);

        svc.charge(&request()).await.unwrap();
        assert_eq!(mock.charge_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_charge_insufficient_balance_not_retried() {
        let mock = MockLedger::new(vec![Err(ClientError::InsufficientBalance)], vec![]);
        let svc = PaymentService::new(mock.clone(), 3);

        let err = svc.charge(&request()).await.unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_BALANCE");
        assert_eq!(mock.charge_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_charge_exhaustion_with_timeout_last() {
        let mock = MockLedger::new(
            vec![
                Err(ClientError::Server(500)),
                Err(ClientError::Server(502)),
                Err(ClientError::Timeout),
            ],
            vec![],
        );
        let svc = PaymentService::new(mock, 3);

        let err = svc.charge(&request()).await.unwrap_err();
        assert_eq!(err.code(), "CHARGE_TIMEOUT");
    }

    #[tokio::test]
    async fn test_charge_exhaustion_with_server_error_last() {
        let mock = MockLedger::new(
            vec![
                Err(ClientError::Timeout),
                Err(ClientError::Timeout),
                Err(ClientError::Server(500)),
            ],
            vec![],
        );
        let svc = PaymentService::new(mock, 3);

        let err = svc.charge(&request()).await.unwrap_err();
        assert_eq!(err.code(), "PAYMENT_SERVICE_ERROR");
    }

    #[tokio::test]
    async fn test_refund_user_not_found_not_retried() {
        let mock = MockLedger::new(vec![], vec![Err(ClientError::UserNotFound)]);
        let svc = PaymentService::new(mock.clone(), 3);

        let err = svc.refund(&request()).await.unwrap_err();
        assert_eq!(err.code(), "USER_NOT_FOUND");
        assert_eq!(mock.refund_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refund_timeout_exhaustion() {
        let mock = MockLedger::new(
            vec![],
            vec![
                Err(ClientError::Timeout),
                Err(ClientError::Timeout),
                Err(ClientError::Timeout),
            ],
        );
        let svc = PaymentService::new(mock.clone(), 3);

        let err = svc.refund(&request()).await.unwrap_err();
        assert_eq!(err.code(), "REFUND_TIMEOUT");
        assert_eq!(mock.refund_calls.load(Ordering::SeqCst), 3);
    }
}
