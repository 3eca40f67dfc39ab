//! Send consumer: one delivery at a time off `sms.send` into the send state
//! machine.

use std::sync::Arc;
use tracing::{info, warn};

use super::classify;
use crate::mq::{ConsumerError, MemoryBroker, MqError, SEND_QUEUE};
use crate::shutdown::ShutdownSignal;
use crate::workflow::{SendMessageCommand, SendService};

pub struct SendConsumer {
    service: Arc<SendService>,
    broker: Arc<MemoryBroker>,
}

impl SendConsumer {
    pub fn new(service: Arc<SendService>, broker: Arc<MemoryBroker>) -> Self {
        Self { service, broker }
    }

    pub async fn run(&self, shutdown: ShutdownSignal) -> Result<(), MqError> {
        info!(queue = SEND_QUEUE, "Starting send consumer");

        let service = self.service.clone();
        self.broker
            .consume(SEND_QUEUE, shutdown, move |body| {
                let service = service.clone();
                async move {
                    let cmd: SendMessageCommand = serde_json::from_slice(&body).map_err(|err| {
                        warn!(error = %err, "Invalid send command payload");
                        ConsumerError::terminal(err)
                    })?;

                    classify(service.send_message(&cmd).await)
                }
            })
            .await
    }
}
