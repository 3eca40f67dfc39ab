//! Bounded retry around the provider API.
//!
//! Backoff is linear (`attempt * 100ms`); an invalid number returns
//! immediately, and a shutdown request interrupts the backoff sleep.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::error::ProviderError;
use super::{SmsApi, SmsResponse};
use crate::shutdown::ShutdownSignal;

const BACKOFF_STEP: Duration = Duration::from_millis(100);

pub struct ProviderService {
    api: Arc<dyn SmsApi>,
    max_retry: u32,
    shutdown: ShutdownSignal,
}

impl ProviderService {
    pub fn new(api: Arc<dyn SmsApi>, max_retry: u32, shutdown: ShutdownSignal) -> Self {
        Self {
            api,
            max_retry,
            shutdown,
        }
    }

    pub async fn send_with_retry(
        &self,
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<SmsResponse, ProviderError> {
        let mut last_err = None;

        for attempt in 1..=self.max_retry {
            debug!(attempt, to, from, "Attempting to send SMS");

            match self.api.send(from, to, text).await {
                Ok(response) => {
                    info!(
                        message_id = %response.message_id,
                        status = %response.status,
                        attempt,
                        "SMS accepted by provider"
                    );
                    return Ok(response);
                }
                Err(err) => {
                    warn!(error = %err, attempt, to, "SMS send attempt failed");

                    if err.is_permanent() {
                        error!(error = %err, to, "Non-retryable provider error");
                        return Err(err);
                    }

                    last_err = Some(err);
                }
            }

            if attempt < self.max_retry {
                let delay = BACKOFF_STEP * attempt;
                debug!(delay_ms = delay.as_millis() as u64, "Waiting before retry");

                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = self.shutdown.requested() => {
                        return Err(ProviderError::Cancelled);
                    }
                }
            }
        }

        let last_err = last_err.expect("retry loop ran at least once");
        error!(
            error = %last_err,
            max_retry = self.max_retry,
            to,
            "All provider retry attempts exhausted"
        );
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider double: pops one outcome per call.
    struct MockProvider {
        script: Mutex<Vec<Result<(), ProviderError>>>,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(script: Vec<Result<(), ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SmsApi for MockProvider {
        async fn send(
            &self,
            _from: &str,
            _to: &str,
            _text: &str,
        ) -> Result<SmsResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            match script.remove(0) {
                Ok(()) => Ok(SmsResponse {
                    message_id: "prov-1".to_string(),
                    provider: "mock".to_string(),
                    status: "accepted".to_string(),
                }),
                Err(e) => Err(e),
            }
        }
    }

    fn service(mock: Arc<MockProvider>, max_retry: u32) -> ProviderService {
        ProviderService::new(mock, max_retry, ShutdownSignal::new())
    }

    #[tokio::test]
    async fn test_transient_failures_then_success() {
        let mock = MockProvider::new(vec![
            Err(ProviderError::Server(503)),
            Err(ProviderError::Server(503)),
            Ok(()),
        ]);
        let svc = service(mock.clone(), 3);

        let resp = svc.send_with_retry("0912", "0913", "hi").await.unwrap();
        assert_eq!(resp.message_id, "prov-1");
        assert_eq!(mock.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_invalid_number_short_circuits() {
        let mock = MockProvider::new(vec![Err(ProviderError::InvalidNumber)]);
        let svc = service(mock.clone(), 3);

        let err = svc.send_with_retry("0912", "bogus", "hi").await.unwrap_err();
        assert!(err.is_permanent());
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let mock = MockProvider::new(vec![
            Err(ProviderError::Server(500)),
            Err(ProviderError::Timeout),
            Err(ProviderError::Server(502)),
        ]);
        let svc = service(mock.clone(), 3);

        let err = svc.send_with_retry("0912", "0913", "hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::Server(502)));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_backoff() {
        let mock = MockProvider::new(vec![
            Err(ProviderError::Server(500)),
            Err(ProviderError::Server(500)),
            Err(ProviderError::Server(500)),
        ]);
        let shutdown = ShutdownSignal::new();
        let svc = ProviderService::new(mock.clone(), 3, shutdown.clone());

        shutdown.request_shutdown();
        let err = svc.send_with_retry("0912", "0913", "hi").await.unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
        assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
    }
}
