//! Process-wide cancellation signal.
//!
//! Every long-lived task (HTTP server, publisher tickers, consumer loops,
//! retry sleeps) holds a clone and either polls or awaits it.

use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { tx: Arc::new(tx), rx }
    }

    pub fn request_shutdown(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_shutdown_requested(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown has been requested.
    pub async fn requested(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_requested_resolves_after_signal() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_shutdown_requested());

        let waiter = signal.clone();
        let handle = tokio::spawn(async move {
            waiter.requested().await;
        });

        signal.request_shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should resolve")
            .unwrap();
        assert!(signal.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_requested_resolves_immediately_when_already_down() {
        let signal = ShutdownSignal::new();
        signal.request_shutdown();
        tokio::time::timeout(Duration::from_millis(100), signal.requested())
            .await
            .expect("should not block");
    }
}
