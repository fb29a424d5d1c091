//! Server startup and the background expiry sweep

use std::time::Duration;

use chrono::Utc;
use orgdesk_config::AppConfig;
use orgdesk_permissions::ActorContext;
use tokio::net::TcpListener;

use crate::{routes, state::AppState};

/// HTTP server bound to a configuration
pub struct ApiServer {
    config: AppConfig,
    state: AppState,
}

impl ApiServer {
    pub async fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let state = AppState::from_config(&config).await?;
        Ok(Self { config, state })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve until the process is stopped
    pub async fn run(self) -> anyhow::Result<()> {
        if self.config.permissions.sweep_interval_secs > 0 {
            spawn_sweep(
                self.state.clone(),
                Duration::from_secs(self.config.permissions.sweep_interval_secs),
            );
        }

        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address).await?;
        tracing::info!(address = %address, "OrgDesk API listening");

        axum::serve(listener, routes::app(self.state)).await?;
        Ok(())
    }
}

/// Run `sweep_expired` on an interval; failures are logged and retried next tick
pub fn spawn_sweep(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let ctx = ActorContext::system();
        loop {
            interval.tick().await;
            match state.permissions.sweep_expired(&ctx, Utc::now()).await {
                Ok(report) => tracing::info!(
                    expired_permissions = report.expired_permissions,
                    expired_requests = report.expired_requests,
                    "Expiry sweep finished"
                ),
                Err(e) => tracing::error!(error = %e, "Expiry sweep failed"),
            }
        }
    })
}
