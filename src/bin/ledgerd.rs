//! Ledger service: the balance HTTP API.

use std::sync::Arc;

use tracing::info;

use sms_services::config::AppConfig;
use sms_services::db::{Database, ensure_ledger_schema};
use sms_services::ledger::{self, LedgerService, LedgerState};
use sms_services::logging;
use sms_services::shutdown::ShutdownSignal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());
    let config = AppConfig::load(&env)?;
    let _guard = logging::init_logging(&config);

    info!(env = %env, build = env!("GIT_HASH"), "Starting ledgerd");

    let db = Arc::new(Database::connect(&config.ledger.database_url).await?);
    ensure_ledger_schema(db.pool()).await?;

    let shutdown = ShutdownSignal::new();
    let state = Arc::new(LedgerState {
        service: LedgerService::new(db.clone()),
        db,
    });

    let server = {
        let shutdown = shutdown.clone();
        let host = config.ledger.host.clone();
        let port = config.ledger.port;
        tokio::spawn(async move { ledger::run_server(&host, port, state, shutdown).await })
    };

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    shutdown.request_shutdown();

    server.await??;

    info!("ledgerd stopped");
    Ok(())
}
