//! Message intake: charge the ledger first, then persist.
//!
//! Paying before persisting means a successful charge always ends with either
//! a message row or a compensating refund attempt, never silent loss. The
//! ledger's `(tx_type, idempotency_key)` uniqueness makes retries at this
//! seam safe.

use std::sync::Arc;
use tracing::{error, info, warn};

use super::commands::{CreateMessageCommand, CreateMessageResponse, GetMessagesQuery};
use super::error::WorkflowError;
use crate::db::{Database, is_unique_violation};
use crate::messages::repository::{MessageRepository, NewMessage, TxLogRepository};
use crate::messages::Message;
use crate::payment::{BalanceChangeRequest, PaymentService};

/// Price of one message in minor units.
const MESSAGE_PRICE: i64 = 1;

pub struct IntakeService {
    db: Arc<Database>,
    payment: Arc<PaymentService>,
}

impl IntakeService {
    pub fn new(db: Arc<Database>, payment: Arc<PaymentService>) -> Self {
        Self { db, payment }
    }

    pub async fn create_message(
        &self,
        cmd: &CreateMessageCommand,
    ) -> Result<CreateMessageResponse, WorkflowError> {
        let charge = BalanceChangeRequest {
            user_id: cmd.from_msisdn.clone(),
            amount: MESSAGE_PRICE,
            idempotency_key: format!("charge-{}-{}", cmd.from_msisdn, cmd.client_message_id),
        };

        if let Err(err) = self.payment.charge(&charge).await {
            warn!(
                client_message_id = %cmd.client_message_id,
                code = err.code(),
                "Message creation aborted due to payment failure"
            );
            return Err(err.into());
        }

        match self.persist(cmd).await {
            Ok(message_id) => {
                info!(
                    message_id,
                    client_message_id = %cmd.client_message_id,
                    "Message created"
                );
                Ok(CreateMessageResponse { message_id })
            }
            Err(err) => {
                error!(
                    client_message_id = %cmd.client_message_id,
                    code = err.code(),
                    "Payment succeeded but message creation failed, initiating refund"
                );

                let refund = BalanceChangeRequest {
                    user_id: cmd.from_msisdn.clone(),
                    amount: MESSAGE_PRICE,
                    idempotency_key: format!(
                        "refund-{}-{}",
                        cmd.from_msisdn, cmd.client_message_id
                    ),
                };

                if let Err(refund_err) = self.payment.refund(&refund).await {
                    error!(
                        client_message_id = %cmd.client_message_id,
                        from_msisdn = %cmd.from_msisdn,
                        code = refund_err.code(),
                        error = %refund_err,
                        "CRITICAL: user charged without service, manual intervention required"
                    );
                } else {
                    warn!(
                        client_message_id = %cmd.client_message_id,
                        "Payment refunded after persistence failure"
                    );
                }

                Err(err)
            }
        }
    }

    /// Insert the message and its outbox row in one transaction. The outbox
    /// row starts CREATED/unpublished; emission belongs to the send publisher.
    async fn persist(&self, cmd: &CreateMessageCommand) -> Result<i64, WorkflowError> {
        let mut tx = self
            .db
            .pool()
            .begin()
            .await
            .map_err(WorkflowError::Database)?;

        let message = NewMessage {
            client_message_id: &cmd.client_message_id,
            from_msisdn: &cmd.from_msisdn,
            to_msisdn: &cmd.to_msisdn,
            text: &cmd.text,
        };

        let message_id = MessageRepository::create(&mut tx, &message)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    WorkflowError::DuplicateMessage
                } else {
                    WorkflowError::Database(err)
                }
            })?;

        TxLogRepository::create(&mut tx, message_id, &cmd.from_msisdn, MESSAGE_PRICE)
            .await
            .map_err(WorkflowError::Database)?;

        tx.commit().await.map_err(WorkflowError::Database)?;

        Ok(message_id)
    }

    pub async fn get_messages(&self, query: &GetMessagesQuery) -> Result<Vec<Message>, WorkflowError> {
        let messages = MessageRepository::list_by_user(
            self.db.pool(),
            &query.user_id,
            query.limit,
            query.offset,
        )
        .await?;

        Ok(messages)
    }
}
