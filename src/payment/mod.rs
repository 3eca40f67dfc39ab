//! Retrying client for the ledger API.
//!
//! [`client::LedgerClient`] speaks HTTP and classifies responses into
//! [`client::ClientError`]; [`service::PaymentService`] wraps it with the
//! bounded retry loop the intake and refund workflows rely on. The
//! idempotency key travels with every attempt, so retries always land on the
//! same ledger transaction.

pub mod client;
pub mod error;
pub mod service;

pub use client::{BalanceChangeRequest, ClientError, LedgerApi, LedgerClient};
pub use error::PaymentError;
pub use service::PaymentService;
