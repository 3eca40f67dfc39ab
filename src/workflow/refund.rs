//! Compensating refund for permanently failed messages.
//!
//! The ledger credit is idempotent on `refund-{messageID}`, so replaying a
//! delivery after a partial failure is safe: the credit lands once and the
//! database update catches up on the next attempt.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::commands::ProcessRefundCommand;
use super::error::WorkflowError;
use crate::db::Database;
use crate::messages::repository::{MessageRepository, TxLogRepository};
use crate::messages::{MessageStatus, TxLog, TxLogState};
use crate::payment::{BalanceChangeRequest, PaymentError, PaymentService};

pub struct RefundService {
    db: Arc<Database>,
    payment: Arc<PaymentService>,
}

impl RefundService {
    pub fn new(db: Arc<Database>, payment: Arc<PaymentService>) -> Self {
        Self { db, payment }
    }

    pub async fn refund(&self, cmd: &ProcessRefundCommand) -> Result<(), WorkflowError> {
        info!(
            tx_log_id = cmd.tx_log_id,
            message_id = cmd.message_id,
            from_msisdn = %cmd.from_msisdn,
            amount = cmd.amount,
            "Processing refund"
        );

        match self.refundable_transaction(cmd.tx_log_id).await {
            Ok(_) => {}
            Err(err @ WorkflowError::Database(_)) => return Err(err),
            Err(err) => {
                debug!(
                    tx_log_id = cmd.tx_log_id,
                    message_id = cmd.message_id,
                    code = err.code(),
                    "Transaction not processable"
                );
                return Ok(());
            }
        }

        let request = BalanceChangeRequest {
            user_id: cmd.from_msisdn.clone(),
            amount: cmd.amount,
            idempotency_key: format!("refund-{}", cmd.message_id),
        };

        match self.payment.refund(&request).await {
            Ok(()) => {
                if let Err(err) = self.mark_refunded(cmd.message_id).await {
                    error!(
                        tx_log_id = cmd.tx_log_id,
                        error = %err,
                        "Payment refunded but database update failed"
                    );
                    return Err(err);
                }

                info!(tx_log_id = cmd.tx_log_id, "Refund completed");
                Ok(())
            }
            Err(PaymentError::UserNotFound) => {
                // Nothing to credit; an operator has to reconcile this one.
                info!(
                    tx_log_id = cmd.tx_log_id,
                    reason = "USER_NOT_FOUND",
                    "Permanent refund failure"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    tx_log_id = cmd.tx_log_id,
                    code = err.code(),
                    "Ledger refund failed, will retry"
                );
                Err(err.into())
            }
        }
    }

    async fn refundable_transaction(&self, tx_log_id: i64) -> Result<TxLog, WorkflowError> {
        let tx_log = TxLogRepository::get_by_id(self.db.pool(), tx_log_id)
            .await?
            .ok_or(WorkflowError::TxLogNotFound)?;

        match tx_log.state {
            TxLogState::Failed => Ok(tx_log),

            TxLogState::Created | TxLogState::Pending | TxLogState::Success => {
                warn!(
                    tx_log_id,
                    state = %tx_log.state,
                    "Transaction not in refundable state"
                );
                Err(WorkflowError::RefundInvalidState)
            }

            TxLogState::Refunded => {
                info!(tx_log_id, "Transaction already refunded");
                Err(WorkflowError::RefundAlreadyProcessed)
            }
        }
    }

    async fn mark_refunded(&self, message_id: i64) -> Result<(), WorkflowError> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(WorkflowError::Database)?;

        MessageRepository::update_status(&mut tx, message_id, MessageStatus::Refunded)
            .await
            .map_err(WorkflowError::Database)?;
        TxLogRepository::update_state_by_message_id(&mut tx, message_id, TxLogState::Refunded)
            .await
            .map_err(WorkflowError::Database)?;

        tx.commit().await.map_err(WorkflowError::Database)?;

        info!(message_id, "Message and transaction marked refunded");
        Ok(())
    }
}
