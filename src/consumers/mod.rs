//! Queue consumers.
//!
//! Each consumer decodes its command, invokes the workflow, and feeds the
//! outcome through one classifier: retriable errors become temporary
//! [`ConsumerError`]s (nack-with-requeue), everything else is logged and
//! acked. Undecodable payloads are terminal by definition.

pub mod refund;
pub mod send;

pub use refund::RefundConsumer;
pub use send::SendConsumer;

use tracing::warn;

use crate::mq::{ConsumerError, HandlerResult};
use crate::workflow::WorkflowError;

/// The one place a workflow outcome turns into a broker disposition.
pub(crate) fn classify(result: Result<(), WorkflowError>) -> HandlerResult {
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_retriable() => Err(ConsumerError::temporary(err)),
        Err(err) => {
            warn!(code = err.code(), error = %err, "Dropping job after terminal error");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::PaymentError;
    use crate::provider::ProviderError;

    #[test]
    fn test_classify_success_acks() {
        assert!(classify(Ok(())).is_ok());
    }

    #[test]
    fn test_classify_retriable_requeues() {
        let result = classify(Err(WorkflowError::Database(sqlx::Error::RowNotFound)));
        let err = result.unwrap_err();
        assert!(err.is_temporary());

        let result = classify(Err(WorkflowError::Provider(ProviderError::Timeout)));
        assert!(result.unwrap_err().is_temporary());
    }

    #[test]
    fn test_classify_terminal_acks() {
        assert!(classify(Err(WorkflowError::Payment(PaymentError::UserNotFound))).is_ok());
        assert!(classify(Err(WorkflowError::Provider(ProviderError::InvalidNumber))).is_ok());
        assert!(classify(Err(WorkflowError::RefundAlreadyProcessed)).is_ok());
    }
}
