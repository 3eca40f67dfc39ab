//! Gateway orchestration: charge → persist → publish → send → refund.
//!
//! - [`intake`] charges the ledger, then writes the message and its outbox
//!   row in one local transaction, compensating with a refund when the write
//!   fails after a successful charge.
//! - [`send`] runs the per-message delivery state machine on behalf of the
//!   send consumer.
//! - [`refund`] issues the compensating ledger credit for permanently failed
//!   messages.
//! - [`outbox`] selects and marks the batches the publishers emit.

pub mod commands;
pub mod error;
pub mod intake;
pub mod outbox;
pub mod refund;
pub mod send;

mod integration_tests;

pub use commands::{
    CreateMessageCommand, GetMessagesQuery, ProcessRefundCommand, SendMessageCommand,
};
pub use error::WorkflowError;
pub use intake::IntakeService;
pub use outbox::OutboxService;
pub use refund::RefundService;
pub use send::SendService;
