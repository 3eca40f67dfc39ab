//! Send publisher: emits send commands for CREATED, unpublished outbox rows
//! and advances them to PENDING.

use std::sync::Arc;
use tokio::time::interval;
use tracing::{error, info};

use super::PollerConfig;
use crate::mq::{Publisher, SEND_QUEUE};
use crate::shutdown::ShutdownSignal;
use crate::workflow::{OutboxService, WorkflowError};

pub struct SendPublisher {
    outbox: Arc<OutboxService>,
    publisher: Arc<dyn Publisher>,
    config: PollerConfig,
}

impl SendPublisher {
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

    /// Poll until shutdown.
    pub async fn run(&self, shutdown: ShutdownSignal) {
        info!(
            interval_secs = self.config.interval.as_secs(),
            batch_size = self.config.batch_size,
            "Starting send publisher"
        );

        let mut ticker = interval(self.config.interval);
        loop {
            tokio::select! {
                _ = shutdown.requested() => {
                    info!("Send publisher stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.publish_batch().await {
                        error!(error = %err, "Send publish cycle failed");
                    }
                }
            }
        }
    }

    /// Publish one batch; returns how many rows were emitted and marked.
    pub async fn publish_batch(&self) -> Result<usize, WorkflowError> {
        let commands = self
            .outbox
            .messages_to_publish(self.config.batch_size)
            .await?;

        if commands.is_empty() {
            return Ok(0);
        }

        info!(count = commands.len(), "Publishing send commands");

        let mut published = 0;
        for cmd in &commands {
            let body = match serde_json::to_vec(cmd) {
                Ok(body) => body,
                Err(err) => {
                    error!(message_id = cmd.message_id, error = %err, "Failed to encode send command");
                    continue;
                }
            };

            if let Err(err) = self.publisher.publish(SEND_QUEUE, body).await {
                error!(message_id = cmd.message_id, error = %err, "Failed to publish send command");
                continue;
            }

            if self
                .outbox
                .mark_message_published(cmd.message_id)
                .await
                .is_err()
            {
                continue;
            }

            published += 1;
        }

        if published > 0 {
            info!(published, total = commands.len(), "Published send commands");
        }

        Ok(published)
    }
}
