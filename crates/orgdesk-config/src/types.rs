//! Core configuration types and data structures

use std::path::PathBuf;

use orgdesk_permissions::PermissionSettings;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Storage backend selection
    pub storage: StorageConfig,
    /// Access-request review limits
    pub review: ReviewConfig,
    /// Audit trail queries and logging
    pub audit: AuditConfig,
    /// Background permission maintenance
    pub permissions: PermissionsConfig,
    /// Log output
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Service tunables derived from the review and audit sections
    pub fn permission_settings(&self) -> PermissionSettings {
        PermissionSettings {
            min_comment_chars: self.review.min_comment_chars,
            max_duration_days: self.review.max_duration_days,
            pending_ttl_days: self.review.pending_ttl_days,
            default_page_size: self.audit.default_page_size,
            max_page_size: self.audit.max_page_size,
            log_access_checks: self.audit.log_access_checks,
        }
    }

    /// `host:port` the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory holding the JSON snapshots of the file backend
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("orgdesk"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReviewConfig {
    /// Minimum review comment length
    pub min_comment_chars: usize,
    pub max_duration_days: u32,
    /// Age after which the sweep expires pending requests
    pub pending_ttl_days: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        let settings = PermissionSettings::default();
        Self {
            min_comment_chars: settings.min_comment_chars,
            max_duration_days: settings.max_duration_days,
            pending_ttl_days: settings.pending_ttl_days,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuditConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
    /// Record best-effort access checks in the audit trail
    pub log_access_checks: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        let settings = PermissionSettings::default();
        Self {
            default_page_size: settings.default_page_size,
            max_page_size: settings.max_page_size,
            log_access_checks: settings.log_access_checks,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PermissionsConfig {
    /// Seconds between expiry sweeps; 0 disables the sweep
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Configuration manager trait
pub trait ConfigManager {
    /// Load configuration
    fn load_config(&mut self) -> Result<AppConfig, crate::error::ConfigError>;
    /// Save configuration
    fn save_config(&self, config: &AppConfig) -> Result<(), crate::error::ConfigError>;
    /// Validate configuration
    fn validate_config(&self, config: &AppConfig) -> Result<(), crate::error::ConfigError>;
}
