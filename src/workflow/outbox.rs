//! Outbox selection and bookkeeping for the publishers.

use std::sync::Arc;
use tracing::{debug, error};

use super::commands::{ProcessRefundCommand, SendMessageCommand};
use super::error::WorkflowError;
use crate::db::Database;
use crate::messages::repository::TxLogRepository;

pub struct OutboxService {
    db: Arc<Database>,
}

impl OutboxService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Send commands for outbox rows not yet emitted, oldest first.
    pub async fn messages_to_publish(
        &self,
        limit: i64,
    ) -> Result<Vec<SendMessageCommand>, WorkflowError> {
        debug!(batch_size = limit, "Finding messages to publish");

        let rows = TxLogRepository::find_unpublished_created(self.db.pool(), limit)
            .await
            .map_err(|err| {
                error!(error = %err, "Failed to find unpublished messages");
                WorkflowError::from(err)
            })?;

        Ok(rows
            .into_iter()
            .map(|row| SendMessageCommand {
                message_id: row.message_id,
                from_msisdn: row.from_msisdn,
                to_msisdn: row.to_msisdn,
                text: row.text,
            })
            .collect())
    }

    pub async fn mark_message_published(&self, message_id: i64) -> Result<(), WorkflowError> {
        TxLogRepository::mark_send_published(self.db.pool(), message_id)
            .await
            .map_err(|err| {
                error!(message_id, error = %err, "Failed to mark tx_log published");
                WorkflowError::from(err)
            })?;

        debug!(message_id, "Marked message as published");
        Ok(())
    }

    /// Refund commands for failed outbox rows not yet emitted.
    pub async fn refunds_to_publish(
        &self,
        limit: i64,
    ) -> Result<Vec<ProcessRefundCommand>, WorkflowError> {
        debug!(batch_size = limit, "Finding refunds to publish");

        let rows = TxLogRepository::find_unpublished_failed(self.db.pool(), limit)
            .await
            .map_err(|err| {
                error!(error = %err, "Failed to find unpublished failed transactions");
                WorkflowError::from(err)
            })?;

        Ok(rows
            .into_iter()
            .map(|tx_log| ProcessRefundCommand {
                tx_log_id: tx_log.id,
                message_id: tx_log.message_id,
                from_msisdn: tx_log.from_msisdn,
                amount: tx_log.amount,
            })
            .collect())
    }

    pub async fn mark_refund_published(&self, tx_log_id: i64) -> Result<(), WorkflowError> {
        TxLogRepository::mark_refund_published(self.db.pool(), tx_log_id)
            .await
            .map_err(|err| {
                error!(tx_log_id, error = %err, "Failed to mark refund tx published");
                WorkflowError::from(err)
            })?;

        debug!(tx_log_id, "Marked refund as published");
        Ok(())
    }
}
