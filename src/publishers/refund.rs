//! Refund publisher: emits refund commands for FAILED, unpublished outbox
//! rows. The row stays FAILED until the refund consumer finalises it.

use std::sync::Arc;
use tokio::time::interval;
use tracing::{error, info};

use super::PollerConfig;
use crate::mq::{Publisher, REFUND_QUEUE};
use crate::shutdown::ShutdownSignal;
use crate::workflow::{OutboxService, WorkflowError};

pub struct RefundPublisher {
    outbox: Arc<OutboxService>,
    publisher: Arc<dyn Publisher>,
    config: PollerConfig,
}

impl RefundPublisher {
    pub fn new(
        outbox: Arc<OutboxService>,
        publisher: Arc<dyn Publisher>,
        config: PollerConfig,
    ) -> Self {
        Self {
            outbox,
            publisher,
            config,
        }
    }

    pub async fn run(&self, shutdown: ShutdownSignal) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            batch_size = self.config.batch_size,
            "Starting refund publisher"
        );

        let mut ticker = interval(self.config.interval);
        loop {
            tokio::select! {
                _ = shutdown.requested() => {
                    info!("Refund publisher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.publish_batch().await {
                        error!(error = %err, "Refund publish cycle failed");
                    }
                }
            }
        }
    }

    pub async fn publish_batch(&self) -> Result<usize, WorkflowError> {
        let commands = self
            .outbox
            .refunds_to_publish(self.config.batch_size)
            .await?;

        if commands.is_empty() {
            return Ok(0);
        }

        info!(count = commands.len(), "Publishing refund commands");

        let mut published = 0;
        for cmd in &commands {
            let body = match serde_json::to_vec(cmd) {
                Ok(body) => body,
                Err(err) => {
                    error!(tx_log_id = cmd.tx_log_id, error = %err, "Failed to encode refund command");
                    continue;
                }
            };

            if let Err(err) = self.publisher.publish(REFUND_QUEUE, body).await {
                error!(tx_log_id = cmd.tx_log_id, error = %err, "Failed to publish refund command");
                continue;
            }

            if self
                .outbox
                .mark_refund_published(cmd.tx_log_id)
                .await
                .is_err()
            {
                continue;
            }

            published += 1;
        }

        if published > 0 {
            info!(published, total = commands.len(), "Published refund commands");
        }

        Ok(published)
    }
}
