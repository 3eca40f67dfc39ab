//! Upstream SMS provider client.
//!
//! [`http::HttpSmsProvider`] speaks the provider's HTTP API; [`retry`]
//! wraps it with bounded, linearly backed-off retries. An invalid-number
//! response short-circuits the loop so the send consumer can mark the
//! message permanently failed.

pub mod error;
pub mod http;
pub mod retry;

pub use error::ProviderError;
pub use http::HttpSmsProvider;
pub use retry::ProviderService;

use async_trait::async_trait;
use serde::Deserialize;

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, Deserialize)]
pub struct SmsResponse {
    pub message_id: String,
    pub provider: String,
    pub status: String,
}

/// Seam between the retry wrapper and the wire; tests substitute mocks.
#[async_trait]
pub trait SmsApi: Send + Sync {
    async fn send(&self, from: &str, to: &str, text: &str) -> Result<SmsResponse, ProviderError>;
}
