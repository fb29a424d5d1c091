//! Configuration manager implementation

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::{
    error::{ConfigError, Result},
    types::{AppConfig, ConfigManager as ConfigManagerTrait},
};

const DEFAULT_ENV_PREFIX: &str = "ORGDESK";

/// Upper bound for day counts in the review section
pub const MAX_REVIEW_DAYS: u32 = 36_500;

/// Loads, saves and validates [`AppConfig`]
///
/// Environment variables take the form `ORGDESK_<SECTION>__<KEY>`, for
/// example `ORGDESK_SERVER__PORT=9000`.
pub struct ConfigManager {
    /// Configuration file path
    config_path: PathBuf,
    /// Environment prefix
    env_prefix: String,
}

impl ConfigManager {
    /// Create a manager using the default config path
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Create with custom config path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orgdesk")
            .join("config.toml")
    }
}

impl ConfigManagerTrait for ConfigManager {
    fn load_config(&mut self) -> Result<AppConfig> {
        let path = self.config_path.to_string_lossy().into_owned();
        let builder = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        self.validate_config(&config)?;
        tracing::debug!(path = %self.config_path.display(), "Configuration loaded");
        Ok(config)
    }

    fn save_config(&self, config: &AppConfig) -> Result<()> {
        self.validate_config(config)?;
        let toml = toml::to_string_pretty(config)?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.config_path, toml)?;
        tracing::info!(path = %self.config_path.display(), "Configuration saved");
        Ok(())
    }

    fn validate_config(&self, config: &AppConfig) -> Result<()> {
        if config.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port must be greater than 0".to_string(),
            ));
        }
        if config.audit.default_page_size == 0 || config.audit.max_page_size == 0 {
            return Err(ConfigError::Validation(
                "Audit page sizes must be greater than 0".to_string(),
            ));
        }
        if config.audit.max_page_size < config.audit.default_page_size {
            return Err(ConfigError::Validation(
                "audit.max_page_size must not be below audit.default_page_size".to_string(),
            ));
        }
        if config.review.min_comment_chars == 0 {
            return Err(ConfigError::Validation(
                "review.min_comment_chars must be greater than 0".to_string(),
            ));
        }
        for (key, days) in [
            ("review.max_duration_days", config.review.max_duration_days),
            ("review.pending_ttl_days", config.review.pending_ttl_days),
        ] {
            if days == 0 || days > MAX_REVIEW_DAYS {
                return Err(ConfigError::Validation(format!(
                    "{} must be between 1 and {}",
                    key, MAX_REVIEW_DAYS
                )));
            }
        }
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
