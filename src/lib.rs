//! SMS delivery platform with an integrated balance ledger.
//!
//! Two cooperating services built from one library crate:
//!
//! - `ledgerd` — owns user balances and an append-only transaction journal,
//!   exposed over an idempotent HTTP API ([`ledger`]).
//! - `gatewayd` — owns messages and their transactional outbox, and drives the
//!   charge → persist → publish → send → refund-on-failure workflow
//!   ([`workflow`], [`publishers`], [`consumers`]).
//!
//! # Modules
//!
//! - [`config`] - YAML configuration with environment overrides
//! - [`db`] - PostgreSQL pool wrapper and driver-level error predicates
//! - [`ledger`] - balance ledger service core and HTTP surface
//! - [`messages`] - message and tx-log models and repositories
//! - [`mq`] - durable-queue abstraction with ack/nack semantics
//! - [`payment`] - retrying client for the ledger API
//! - [`provider`] - SMS provider client with bounded retry
//! - [`workflow`] - intake, send and refund orchestration
//! - [`publishers`] - outbox pollers emitting queue commands
//! - [`consumers`] - queue consumers bridging the broker to the workflow

pub mod config;
pub mod consumers;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod messages;
pub mod mq;
pub mod payment;
pub mod provider;
pub mod publishers;
pub mod shutdown;
pub mod workflow;

pub use config::AppConfig;
pub use db::Database;
pub use shutdown::ShutdownSignal;
