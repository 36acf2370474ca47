//! roost - Server Transfer Control Plane
//!
//! Entry point: load config, init logging, connect PostgreSQL, serve the
//! daemon webhook gateway.

use std::sync::Arc;
use std::time::Duration;

use roost::config::AppConfig;
use roost::daemon::DaemonClient;
use roost::db::Database;
use roost::gateway::{self, state::AppState};
use roost::logging::init_logging;
use roost::transfer::{TransferStore, TransitionEngine};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let config = AppConfig::load(&env)?;
    let _log_guard = init_logging(&config);

    tracing::info!("Starting roost (env: {})", env);

    let db = Arc::new(Database::connect(&config.postgres_url).await?);

    let daemon = Arc::new(DaemonClient::new(Duration::from_secs(
        config.daemon.timeout_secs,
    ))?);

    let store = TransferStore::new(db.pool().clone());
    let engine = TransitionEngine::new(store, daemon);
    let state = Arc::new(AppState::new(engine, db));

    gateway::serve(&config.gateway, state).await
}
