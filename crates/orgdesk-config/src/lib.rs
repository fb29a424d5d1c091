//! OrgDesk configuration
//!
//! Loads [`AppConfig`] from built-in defaults, an optional TOML file and
//! `ORGDESK_*` environment variables, in that order of precedence.

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::{ConfigManager, MAX_REVIEW_DAYS};
pub use types::{
    AppConfig, AuditConfig, ConfigManager as ConfigManagerTrait, LoggingConfig,
    PermissionsConfig, ReviewConfig, ServerConfig, StorageBackend, StorageConfig,
};
