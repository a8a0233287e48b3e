//! Configuration management for jobpvc

pub mod schema;

pub use schema::{CloudConfig, Config, VolumeConfig};

use crate::error::{JobPvcError, JobPvcResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jobpvc")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jobpvc")
    }

    /// Get the audit log path
    pub fn audit_log_path() -> PathBuf {
        Self::state_dir().join("audit.log")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> JobPvcResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> JobPvcResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| JobPvcError::io(format!("reading config from {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| JobPvcError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::validate(path, &config)?;
        Ok(config)
    }

    /// Reject cloud lists the reconciler could not address unambiguously
    fn validate(path: &Path, config: &Config) -> JobPvcResult<()> {
        for (i, cloud) in config.clouds.iter().enumerate() {
            if cloud.name.trim().is_empty() {
                return Err(JobPvcError::ConfigInvalid {
                    path: path.to_path_buf(),
                    reason: format!("clouds[{}] has an empty name", i),
                });
            }
            if config.clouds[..i].iter().any(|c| c.name == cloud.name) {
                return Err(JobPvcError::ConfigInvalid {
                    path: path.to_path_buf(),
                    reason: format!("duplicate cloud name '{}'", cloud.name),
                });
            }
        }
        Ok(())
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> JobPvcResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            JobPvcError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> JobPvcResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| JobPvcError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
