//! Send state machine, executed once per delivery of a send command.
//!
//! Returning `Ok(())` tells the consumer to ack: the job either finished or
//! reached a state someone else owns. Returning an error defers to
//! [`WorkflowError::is_retriable`] for the ack/nack decision.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::commands::SendMessageCommand;
use super::error::WorkflowError;
use crate::db::Database;
use crate::messages::repository::{MessageRepository, TxLogRepository};
use crate::messages::{Message, MessageStatus, TxLogState};
use crate::provider::{ProviderService, SmsResponse};

pub struct SendService {
    db: Arc<Database>,
    provider: ProviderService,
    max_retries: i32,
    stale_threshold: Duration,
}

impl SendService {
    pub fn new(
        db: Arc<Database>,
        provider: ProviderService,
        max_retries: i32,
        stale_threshold: Duration,
    ) -> Self {
        Self {
            db,
            provider,
            max_retries,
            stale_threshold,
        }
    }

    pub async fn send_message(&self, cmd: &SendMessageCommand) -> Result<(), WorkflowError> {
        let msg = match self.message_for_processing(cmd.message_id).await {
            Ok(msg) => msg,
            Err(err @ WorkflowError::Database(_)) => return Err(err),
            Err(err) => {
                debug!(
                    message_id = cmd.message_id,
                    code = err.code(),
                    "Message not processable"
                );
                return Ok(());
            }
        };

        // A live SENDING row keeps its attempt number: the prior attempt is
        // presumed dead and this delivery finishes it.
        let attempt = if msg.status == MessageStatus::Sending {
            msg.attempt_count
        } else {
            msg.attempt_count + 1
        };

        if attempt > self.max_retries {
            warn!(
                message_id = cmd.message_id,
                attempts = attempt,
                "Message exceeded max retries"
            );
            self.record_permanent_failure(cmd.message_id, "exceeded max retries")
                .await?;
            return Ok(());
        }

        match self.claim(cmd.message_id, attempt).await {
            Ok(()) => {}
            Err(WorkflowError::MessageBeingProcessed) => return Ok(()),
            Err(err) => {
                debug!(
                    message_id = cmd.message_id,
                    error = %err,
                    "Failed to move message to SENDING"
                );
                return Err(err);
            }
        }

        debug!(
            message_id = cmd.message_id,
            attempt,
            max_retries = self.max_retries,
            to = %cmd.to_msisdn,
            from = %cmd.from_msisdn,
            "Attempting to send SMS"
        );

        match self
            .provider
            .send_with_retry(&cmd.from_msisdn, &cmd.to_msisdn, &cmd.text)
            .await
        {
            Ok(response) => {
                info!(
                    message_id = cmd.message_id,
                    provider_message_id = %response.message_id,
                    provider = %response.provider,
                    attempt,
                    "SMS sent"
                );
                self.record_submitted(cmd.message_id, &response).await;
                Ok(())
            }
            Err(err) if err.is_permanent() => {
                warn!(
                    message_id = cmd.message_id,
                    reason = err.code(),
                    "Permanent provider failure, marking for refund"
                );
                self.record_permanent_failure(cmd.message_id, err.code())
                    .await?;
                Ok(())
            }
            Err(err) => {
                debug!(
                    message_id = cmd.message_id,
                    attempt,
                    remaining = self.max_retries - attempt,
                    error = %err,
                    "Temporary provider failure, will retry"
                );
                self.record_temporary_failure(cmd.message_id, err.code())
                    .await?;
                Err(err.into())
            }
        }
    }

    /// Gate on the current status. Errors other than `Database` mean the
    /// delivery should be dropped without another attempt.
    async fn message_for_processing(&self, message_id: i64) -> Result<Message, WorkflowError> {
        let msg = MessageRepository::get_by_id(self.db.pool(), message_id)
            .await?
            .ok_or(WorkflowError::MessageNotFound)?;

        match msg.status {
            MessageStatus::Created => Ok(msg),

            MessageStatus::Sending => {
                let stale_before = Utc::now() - self.stale_chrono();
                match msg.last_attempt_at {
                    Some(last) if last >= stale_before => {
                        warn!(
                            message_id,
                            last_attempt_at = %last,
                            "Message being processed by another consumer"
                        );
                        Err(WorkflowError::MessageBeingProcessed)
                    }
                    _ => Ok(msg),
                }
            }

            MessageStatus::FailedTemp => {
                info!(message_id, "Message was temporarily failed, retrying");
                Ok(msg)
            }

            MessageStatus::Submitted | MessageStatus::FailedPerm | MessageStatus::Refunded => {
                info!(message_id, status = %msg.status, "Message already processed");
                Err(WorkflowError::MessageAlreadyProcessed)
            }
        }
    }

    /// The conditional UPDATE is the consumer lease: zero rows affected means
    /// another consumer claimed the message first.
    async fn claim(&self, message_id: i64, attempt: i32) -> Result<(), WorkflowError> {
        let stale_before = Utc::now() - self.stale_chrono();

        let rows =
            MessageRepository::claim_for_sending(self.db.pool(), message_id, attempt, stale_before)
                .await?;

        if rows == 0 {
            info!(
                message_id,
                "Message not moved to SENDING, claimed by another consumer"
            );
            return Err(WorkflowError::MessageBeingProcessed);
        }

        Ok(())
    }

    /// The provider accepted the message; failing to record that must not
    /// trigger a redelivery, so errors here are logged and swallowed.
    async fn record_submitted(&self, message_id: i64, response: &SmsResponse) {
        let result = async {
            let mut tx = self.db.pool().begin().await?;
            MessageRepository::update_submitted(
                &mut tx,
                message_id,
                &response.provider,
                &response.message_id,
            )
            .await?;
            TxLogRepository::update_state_by_message_id(&mut tx, message_id, TxLogState::Success)
                .await?;
            tx.commit().await
        }
        .await;

        if let Err(err) = result {
            error!(
                message_id,
                provider_message_id = %response.message_id,
                error = %err,
                "Failed to record submitted message"
            );
        }
    }

    async fn record_permanent_failure(
        &self,
        message_id: i64,
        last_error: &str,
    ) -> Result<(), WorkflowError> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(WorkflowError::Database)?;

        MessageRepository::update_status(&mut tx, message_id, MessageStatus::FailedPerm)
            .await
            .map_err(WorkflowError::Database)?;
        TxLogRepository::update_perm_failed(&mut tx, message_id, last_error)
            .await
            .map_err(WorkflowError::Database)?;

        tx.commit().await.map_err(WorkflowError::Database)
    }

    async fn record_temporary_failure(
        &self,
        message_id: i64,
        last_error: &str,
    ) -> Result<(), WorkflowError> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(WorkflowError::Database)?;

        MessageRepository::update_status(&mut tx, message_id, MessageStatus::FailedTemp)
            .await
            .map_err(WorkflowError::Database)?;
        TxLogRepository::set_last_error_by_message_id(&mut tx, message_id, last_error)
            .await
            .map_err(WorkflowError::Database)?;

        tx.commit().await.map_err(WorkflowError::Database)
    }

    fn stale_chrono(&self) -> ChronoDuration {
        ChronoDuration::from_std(self.stale_threshold).unwrap_or_else(|_| ChronoDuration::minutes(5))
    }
}
