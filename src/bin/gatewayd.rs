//! Gateway service: intake HTTP API, outbox publishers, and queue consumers,
//! all hosted in one process on a shared shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use sms_services::config::AppConfig;
use sms_services::consumers::{RefundConsumer, SendConsumer};
use sms_services::db::{Database, ensure_gateway_schema};
use sms_services::gateway::{self, AppState};
use sms_services::logging;
use sms_services::mq::{MemoryBroker, REFUND_QUEUE, SEND_QUEUE};
use sms_services::payment::{LedgerClient, PaymentService};
use sms_services::provider::{HttpSmsProvider, ProviderService};
use sms_services::publishers::{PollerConfig, RefundPublisher, SendPublisher};
use sms_services::shutdown::ShutdownSignal;
use sms_services::workflow::{IntakeService, OutboxService, RefundService, SendService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = AppConfig::load(&env)?;
    let _guard = logging::init_logging(&config);

    info!(env = %env, build = env!("GIT_HASH"), "Starting gatewayd");

    let db = Arc::new(Database::connect(&config.gateway.database_url).await?);
    ensure_gateway_schema(db.pool()).await?;

    let shutdown = ShutdownSignal::new();

    let broker = Arc::new(MemoryBroker::new());
    broker.declare(SEND_QUEUE);
    broker.declare(REFUND_QUEUE);

    let ledger_api = Arc::new(LedgerClient::new(&config.payment));
    let payment = Arc::new(PaymentService::new(ledger_api, config.payment.max_retries));

    let provider_api = Arc::new(HttpSmsProvider::new(&config.provider));
    let provider = ProviderService::new(provider_api, config.provider.max_retry, shutdown.clone());

    let outbox = Arc::new(OutboxService::new(db.clone()));
    let send_service = Arc::new(SendService::new(
        db.clone(),
        provider,
        config.sender.max_retries,
        Duration::from_secs(config.sender.stale_threshold_secs),
    ));
    let refund_service = Arc::new(RefundService::new(db.clone(), payment.clone()));

    let poller_config = PollerConfig::from(&config.publisher);
    let mut tasks = Vec::new();

    {
        let publisher = SendPublisher::new(outbox.clone(), broker.clone(), poller_config.clone());
        let shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            publisher.run(shutdown).await;
        }));
    }

    {
        let publisher = RefundPublisher::new(outbox.clone(), broker.clone(), poller_config);
        let shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            publisher.run(shutdown).await;
        }));
    }

    {
        let consumer = SendConsumer::new(send_service, broker.clone());
        let shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(err) = consumer.run(shutdown).await {
                error!(error = %err, "Send consumer exited with error");
            }
        }));
    }

    {
        let consumer = RefundConsumer::new(refund_service, broker.clone());
        let shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            if let Err(err) = consumer.run(shutdown).await {
                error!(error = %err, "Refund consumer exited with error");
            }
        }));
    }

    let state = Arc::new(AppState::new(
        IntakeService::new(db.clone(), payment),
        db.clone(),
    ));

    let server = {
        let shutdown = shutdown.clone();
        let host = config.gateway.host.clone();
        let port = config.gateway.port;
        tokio::spawn(async move { gateway::run_server(&host, port, state, shutdown).await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    shutdown.request_shutdown();

    for task in tasks {
        let _ = task.await;
    }
    server.await??;

    info!("gatewayd stopped");
    Ok(())
}
