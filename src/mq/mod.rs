//! Durable-queue abstraction.
//!
//! The gateway treats the broker as a black box with named queues,
//! at-least-once delivery, manual ack and nack-with-requeue. Handlers report
//! failures through [`ConsumerError`]; the single [`should_requeue`]
//! classifier decides ack vs requeue so broker concerns never leak into
//! business code.

pub mod memory;

pub use memory::MemoryBroker;

use async_trait::async_trait;
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Queue carrying send commands to the send consumer.
pub const SEND_QUEUE: &str = "sms.send";
/// Queue carrying refund commands to the refund consumer.
pub const REFUND_QUEUE: &str = "sms.refund";

#[derive(Debug, Error)]
pub enum MqError {
    #[error("queue {0} is not declared")]
    UnknownQueue(String),

    #[error("queue {0} is closed")]
    Closed(String),

    #[error("queue {0} already has a consumer")]
    ConsumerTaken(String),
}

/// Publish side of the broker.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, queue: &str, body: Vec<u8>) -> Result<(), MqError>;
}

type BoxError = Box<dyn StdError + Send + Sync>;

/// Handler failure with its broker disposition attached.
///
/// Temporary errors are nacked back onto the queue; everything else is
/// acked and dropped after logging.
#[derive(Debug)]
pub struct ConsumerError {
    temporary: bool,
    source: BoxError,
}

impl ConsumerError {
    pub fn temporary(source: impl Into<BoxError>) -> Self {
        Self {
            temporary: true,
            source: source.into(),
        }
    }

    pub fn terminal(source: impl Into<BoxError>) -> Self {
        Self {
            temporary: false,
            source: source.into(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }
}

impl fmt::Display for ConsumerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl StdError for ConsumerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.source.as_ref())
    }
}

pub type HandlerResult = Result<(), ConsumerError>;

/// The one place where a handler outcome turns into an ack/nack decision.
pub fn should_requeue(err: &ConsumerError) -> bool {
    err.is_temporary()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_requeue_only_temporary() {
        let temp = ConsumerError::temporary("transient");
        let term = ConsumerError::terminal("fatal");

        assert!(should_requeue(&temp));
        assert!(!should_requeue(&term));
    }

    #[test]
    fn test_display_shows_source() {
        let err = ConsumerError::temporary("queue hiccup");
        assert_eq!(err.to_string(), "queue hiccup");
    }
}
