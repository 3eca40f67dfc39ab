//! Refund consumer: one delivery at a time off `sms.refund` into the refund
//! workflow.

use std::sync::Arc;
use tracing::{info, warn};

use super::classify;
use crate::mq::{ConsumerError, MemoryBroker, MqError, REFUND_QUEUE};
use crate::shutdown::ShutdownSignal;
use crate::workflow::{ProcessRefundCommand, RefundService};

pub struct RefundConsumer {
    service: Arc<RefundService>,
    broker: Arc<MemoryBroker>,
}

impl RefundConsumer {
    pub fn new(service: Arc<RefundService>, broker: Arc<MemoryBroker>) -> Self {
        Self { service, broker }
    }

    pub async fn run(&self, shutdown: ShutdownSignal) -> Result<(), MqError> {
        info!(queue = REFUND_QUEUE, "Starting refund consumer");

        let service = self.service.clone();
        self.broker
            .consume(REFUND_QUEUE, shutdown, move |body| {
                let service = service.clone();
                async move {
                    let cmd: ProcessRefundCommand =
                        serde_json::from_slice(&body).map_err(|err| {
                            warn!(error = %err, "Invalid refund command payload");
                            ConsumerError::terminal(err)
                        })?;

                    classify(service.refund(&cmd).await)
                }
            })
            .await
    }
}
