//! Outbox pollers.
//!
//! Both publishers run the same shape: tick, select a batch of unemitted
//! outbox rows, publish each to its queue, mark it emitted. Failures on
//! individual rows are logged and skipped; the next tick retries them, so
//! emission is at-least-once and the consumers are built for duplicates.

pub mod refund;
pub mod send;

pub use refund::RefundPublisher;
pub use send::SendPublisher;

use std::time::Duration;

/// Poller cadence and batch bound shared by both publishers.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    pub batch_size: i64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            batch_size: 100,
        }
    }
}

impl From<&crate::config::PublisherConfig> for PollerConfig {
    fn from(cfg: &crate::config::PublisherConfig) -> Self {
        Self {
            interval: Duration::from_secs(cfg.interval_secs),
            batch_size: cfg.batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poller_config_default() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_poller_config_from_settings() {
        let settings = crate::config::PublisherConfig {
            interval_secs: 5,
            batch_size: 10,
        };
        let config = PollerConfig::from(&settings);
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.batch_size, 10);
    }
}
