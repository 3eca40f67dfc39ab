//! Message and transactional-outbox domain: models, state vocabulary, and
//! repositories for the gateway database.

pub mod models;
pub mod repository;

pub use models::{Message, MessageStatus, TxLog, TxLogState};
pub use repository::{MessageRepository, RepoError, TxLogRepository};
