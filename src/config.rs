use serde::{Deserialize, Serialize};
use std::fs;

use anyhow::{Context, Result};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub payment: PaymentConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub publisher: PublisherConfig,
    #[serde(default)]
    pub sender: SenderConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
}

/// Ledger client settings used by the gateway to charge and refund users.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    /// Per-attempt deadline in milliseconds.
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8081".to_string(),
            timeout_ms: 2000,
            max_retries: 3,
        }
    }
}

/// Upstream SMS provider settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    pub url: String,
    /// Per-attempt deadline in milliseconds.
    pub timeout_ms: u64,
    pub max_retry: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:9090/sms".to_string(),
            timeout_ms: 2000,
            max_retry: 3,
        }
    }
}

/// Outbox poller settings shared by the send and refund publishers.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PublisherConfig {
    pub interval_secs: u64,
    pub batch_size: i64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            batch_size: 100,
        }
    }
}

/// Send-consumer state machine settings.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SenderConfig {
    /// Send attempts allowed before a message goes permanently failed.
    pub max_retries: i32,
    /// Age after which a SENDING claim is presumed dead.
    pub stale_threshold_secs: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            stale_threshold_secs: 300,
        }
    }
}

impl AppConfig {
    /// Load config from YAML file based on environment
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config: Self =
            serde_yaml::from_str(&content).context("Failed to parse config yaml")?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Environment variables take precedence over YAML config.
    /// Format: SMS_<SECTION>_<FIELD> (uppercase with underscores)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("SMS_GATEWAY_PORT")
            && let Ok(p) = port.parse::<u16>()
        {
            tracing::info!("Config override: gateway.port = {} (from SMS_GATEWAY_PORT)", p);
            self.gateway.port = p;
        }
        if let Ok(port) = std::env::var("SMS_LEDGER_PORT")
            && let Ok(p) = port.parse::<u16>()
        {
            tracing::info!("Config override: ledger.port = {} (from SMS_LEDGER_PORT)", p);
            self.ledger.port = p;
        }

        if let Ok(url) = std::env::var("SMS_GATEWAY_DATABASE_URL") {
            tracing::info!(
                "Config override: gateway.database_url = [REDACTED] (from SMS_GATEWAY_DATABASE_URL)"
            );
            self.gateway.database_url = url;
        }
        if let Ok(url) = std::env::var("SMS_LEDGER_DATABASE_URL") {
            tracing::info!(
                "Config override: ledger.database_url = [REDACTED] (from SMS_LEDGER_DATABASE_URL)"
            );
            self.ledger.database_url = url;
        }

        if let Ok(url) = std::env::var("SMS_PAYMENT_BASE_URL") {
            tracing::info!("Config override: payment.base_url = {} (from SMS_PAYMENT_BASE_URL)", url);
            self.payment.base_url = url;
        }
        if let Ok(url) = std::env::var("SMS_PROVIDER_URL") {
            tracing::info!("Config override: provider.url = {} (from SMS_PROVIDER_URL)", url);
            self.provider.url = url;
        }

        if let Ok(level) = std::env::var("SMS_LOG_LEVEL") {
            tracing::info!("Config override: log_level = {} (from SMS_LOG_LEVEL)", level);
            self.log_level = level;
        }
    }

    /// Validate configuration at startup
    ///
    /// Returns an error if any critical configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.port == 0 {
            anyhow::bail!("Invalid gateway.port: must be > 0");
        }
        if self.ledger.port == 0 {
            anyhow::bail!("Invalid ledger.port: must be > 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            anyhow::bail!(
                "Invalid log_level '{}': must be one of {:?}",
                self.log_level,
                valid_levels
            );
        }

        if self.publisher.batch_size <= 0 {
            anyhow::bail!("Invalid publisher.batch_size: must be > 0");
        }
        if self.payment.max_retries == 0 {
            anyhow::bail!("Invalid payment.max_retries: must be > 0");
        }
        if self.provider.max_retry == 0 {
            anyhow::bail!("Invalid provider.max_retry: must be > 0");
        }
        if self.sender.max_retries <= 0 {
            anyhow::bail!("Invalid sender.max_retries: must be > 0");
        }

        Ok(())
    }
}
