use std::path::PathBuf;

use anyhow::Context;
use orgdesk_api::{logging, ApiServer};
use orgdesk_config::{ConfigManager, ConfigManagerTrait};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut manager = match std::env::args().nth(1) {
        Some(path) => ConfigManager::with_path(PathBuf::from(path)),
        None => ConfigManager::new(),
    };
    let config = manager
        .load_config()
        .with_context(|| format!("loading {}", manager.config_path().display()))?;

    logging::init(&config.logging)?;
    tracing::info!(
        backend = ?config.storage.backend,
        sweep_interval_secs = config.permissions.sweep_interval_secs,
        "Starting OrgDesk API"
    );

    ApiServer::from_config(config).await?.run().await
}
