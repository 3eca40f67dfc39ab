//! In-process durable queue.
//!
//! Declared queues hold deliveries in unbounded channels; the consume loop
//! processes one delivery at a time (prefetch 1), acks on success, and
//! requeues on temporary failure. Shutdown cancels the consumer and drains
//! briefly before returning, so an in-flight delivery is never abandoned
//! mid-handler.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{ConsumerError, MqError, Publisher, should_requeue};
use crate::shutdown::ShutdownSignal;

const SHUTDOWN_DRAIN: Duration = Duration::from_millis(50);

struct Queue {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
}

#[derive(Default)]
pub struct MemoryBroker {
    queues: Mutex<HashMap<String, Queue>>,
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a queue; redeclaring an existing queue is a no-op.
    pub fn declare(&self, queue: &str) {
        let mut queues = self.queues.lock().unwrap();
        queues.entry(queue.to_string()).or_insert_with(|| {
            let (tx, rx) = mpsc::unbounded_channel();
            Queue { tx, rx: Some(rx) }
        });
    }

    fn sender(&self, queue: &str) -> Result<mpsc::UnboundedSender<Vec<u8>>, MqError> {
        let queues = self.queues.lock().unwrap();
        queues
            .get(queue)
            .map(|q| q.tx.clone())
            .ok_or_else(|| MqError::UnknownQueue(queue.to_string()))
    }

    fn take_receiver(&self, queue: &str) -> Result<mpsc::UnboundedReceiver<Vec<u8>>, MqError> {
        let mut queues = self.queues.lock().unwrap();
        let q = queues
            .get_mut(queue)
            .ok_or_else(|| MqError::UnknownQueue(queue.to_string()))?;
        q.rx.take()
            .ok_or_else(|| MqError::ConsumerTaken(queue.to_string()))
    }

    /// Consume deliveries one at a time until shutdown.
    ///
    /// The handler's [`ConsumerError`] disposition controls requeueing: a
    /// temporary error puts the delivery back on the queue, anything else is
    /// dropped after the handler has logged it.
    pub async fn consume<H, Fut>(
        &self,
        queue: &str,
        shutdown: ShutdownSignal,
        handler: H,
    ) -> Result<(), MqError>
    where
        H: Fn(Vec<u8>) -> Fut,
        Fut: Future<Output = Result<(), ConsumerError>>,
    {
        let mut rx = self.take_receiver(queue)?;
        let tx = self.sender(queue)?;

        loop {
            tokio::select! {
                _ = shutdown.requested() => {
                    // Give an already-enqueued delivery a short drain window,
                    // then stop consuming.
                    tokio::time::sleep(SHUTDOWN_DRAIN).await;
                    debug!(queue, "Consumer cancelled");
                    return Ok(());
                }
                delivery = rx.recv() => {
                    let Some(body) = delivery else {
                        return Ok(());
                    };

                    match handler(body.clone()).await {
                        Ok(()) => {}
                        Err(err) if should_requeue(&err) => {
                            debug!(queue, error = %err, "Requeueing delivery after temporary failure");
                            if tx.send(body).is_err() {
                                return Err(MqError::Closed(queue.to_string()));
                            }
                        }
                        Err(err) => {
                            warn!(queue, error = %err, "Dropping delivery after terminal failure");
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Publisher for MemoryBroker {
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), MqError> {
        let tx = self.sender(queue)?;
        tx.send(body)
            .map_err(|_| MqError::Closed(queue.to_string()))
    }
}
