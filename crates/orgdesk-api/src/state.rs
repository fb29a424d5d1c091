//! Application state for the API server

use std::sync::Arc;

use orgdesk_config::{AppConfig, StorageBackend};
use orgdesk_events::ChangeBus;
use orgdesk_layout::{FileLayoutStore, InMemoryLayoutStore, LayoutService, LayoutStore};
use orgdesk_permissions::{
    FilePermissionStore, InMemoryPermissionStore, PermissionService, PermissionStore,
};

/// Application state shared across all API handlers
#[derive(Clone)]
pub struct AppState {
    /// Requests, grants, templates and audit trail
    pub permissions: PermissionService,
    /// Department sections and customization
    pub layout: LayoutService,
    /// Change notifications shared by both services
    pub bus: ChangeBus,
    /// Server start time for uptime calculation
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create state around existing services
    pub fn new(permissions: PermissionService, layout: LayoutService) -> Self {
        Self {
            bus: permissions.bus().clone(),
            permissions,
            layout,
            start_time: std::time::Instant::now(),
        }
    }

    /// Build stores and services for a configuration
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let bus = ChangeBus::new();
        let (permission_store, layout_store): (Arc<dyn PermissionStore>, Arc<dyn LayoutStore>) =
            match config.storage.backend {
                StorageBackend::Memory => (
                    Arc::new(InMemoryPermissionStore::new()),
                    Arc::new(InMemoryLayoutStore::new()),
                ),
                StorageBackend::File => {
                    let dir = &config.storage.data_dir;
                    tracing::info!(data_dir = %dir.display(), "Using file storage");
                    (
                        Arc::new(FilePermissionStore::in_dir(dir)?),
                        Arc::new(FileLayoutStore::in_dir(dir)?),
                    )
                }
            };

        let permissions =
            PermissionService::new(permission_store, bus.clone(), config.permission_settings());
        let seeded = permissions.seed_system_templates().await?;
        if seeded > 0 {
            tracing::debug!(seeded, "System templates installed");
        }
        let layout = LayoutService::new(layout_store, bus);

        Ok(Self::new(permissions, layout))
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
