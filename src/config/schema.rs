//! Configuration schema for jobpvc
//!
//! Configuration is stored at `~/.config/jobpvc/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Operator defaults for job volumes
    pub volume: VolumeConfig,

    /// Configured cluster backends
    pub clouds: Vec<CloudConfig>,
}

impl Config {
    /// Look up a cloud by name
    pub fn cloud(&self, name: &str) -> Option<&CloudConfig> {
        self.clouds.iter().find(|c| c.name == name)
    }
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable audit logging
    pub audit_log: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self { audit_log: true }
    }
}

/// Job volume settings
///
/// Unset (or empty) values fall back to `10Gi`, `ReadWriteOnce` and the
/// cluster's default storage class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeConfig {
    /// Storage class name
    pub storage_class: Option<String>,

    /// Requested size, may reference environment variables
    pub requests_size: Option<String>,

    /// Access mode literal
    pub access_modes: Option<String>,
}

/// One cluster connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Display name
    pub name: String,

    /// Namespace claims are provisioned into and cleaned up from
    pub namespace: String,

    /// kubeconfig context (current context if unset)
    pub context: Option<String>,

    /// kubeconfig file (kubectl default if unset)
    pub kubeconfig: Option<PathBuf>,

    /// kubectl binary
    pub kubectl: String,

    /// Per-request timeout passed to kubectl
    pub request_timeout_secs: Option<u32>,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            name: "kubernetes".to_string(),
            namespace: "default".to_string(),
            context: None,
            kubeconfig: None,
            kubectl: "kubectl".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl CloudConfig {
    /// Create a cloud with defaults for everything but name and namespace
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Self::default()
        }
    }
}
