//! HTTP implementation of the provider API.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use std::time::Duration;

use super::error::ProviderError;
use super::{SmsApi, SmsResponse};
use crate::config::ProviderConfig;

#[derive(Debug, Serialize)]
struct SendBody<'a> {
    from: &'a str,
    to: &'a str,
    text: &'a str,
}

pub struct HttpSmsProvider {
    client: Client,
    url: String,
}

impl HttpSmsProvider {
    pub fn new(config: &ProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            url: config.url.clone(),
        }
    }
}

#[async_trait]
impl SmsApi for HttpSmsProvider {
    async fn send(&self, from: &str, to: &str, text: &str) -> Result<SmsResponse, ProviderError> {
        let response = self
            .client
            .post(&self.url)
            .json(&SendBody { from, to, text })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        match status {
            StatusCode::OK => response
                .json()
                .await
                .map_err(|_| ProviderError::Server(status.as_u16())),
            StatusCode::BAD_REQUEST => Err(ProviderError::InvalidNumber),
            other => Err(ProviderError::Server(other.as_u16())),
        }
    }
}
