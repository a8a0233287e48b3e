//! Error types for jobpvc
//!
//! All modules use `JobPvcResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for jobpvc operations
pub type JobPvcResult<T> = Result<T, JobPvcError>;

/// All errors that can occur in jobpvc
#[derive(Error, Debug)]
pub enum JobPvcError {
    // Caller contract errors
    #[error("job full name not found, supply the `jobFullName` annotation when provisioning a dynamic job volume")]
    MissingJobFullName,

    #[error("Job name is empty, cannot derive a volume name")]
    EmptyJobName,

    #[error("Invalid access mode '{0}', expected one of ReadWriteOnce, ReadOnlyMany, ReadWriteMany")]
    InvalidAccessMode(String),

    #[error("Unresolved placeholder {placeholder} in '{input}'")]
    UnresolvedPlaceholder { placeholder: String, input: String },

    #[error("Invalid storage quantity: '{0}'")]
    InvalidQuantity(String),

    #[error("Invalid item event: {0}")]
    InvalidEvent(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cloud not configured: {0}")]
    CloudNotFound(String),

    #[error("No clouds configured")]
    NoCloudsConfigured,

    // Cluster errors
    #[error("Failed to connect to cloud {cloud}: {reason}")]
    ClusterUnreachable { cloud: String, reason: String },

    #[error("Not authorized on cloud {cloud}: {reason}")]
    ClusterAuth { cloud: String, reason: String },

    #[error("Cluster command failed: {command}, stderr: {stderr}")]
    ClusterCommand { command: String, stderr: String },

    #[error("Volume already exists: {0}")]
    VolumeConflict(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl JobPvcError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a cluster command error from captured stderr
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::ClusterCommand {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Errors caused by the caller handing over bad input
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::MissingJobFullName
                | Self::EmptyJobName
                | Self::InvalidAccessMode(_)
                | Self::UnresolvedPlaceholder { .. }
                | Self::InvalidQuantity(_)
                | Self::InvalidEvent(_)
        )
    }

    /// Errors raised while talking to a cluster backend
    pub fn is_cluster_error(&self) -> bool {
        matches!(
            self,
            Self::ClusterUnreachable { .. }
                | Self::ClusterAuth { .. }
                | Self::ClusterCommand { .. }
                | Self::VolumeConflict(_)
                | Self::CommandFailed { .. }
        )
    }

    /// Errors where the backend was never reached or refused our identity
    ///
    /// Anything left behind on that cloud is unknown.
    pub fn is_connectivity_error(&self) -> bool {
        matches!(
            self,
            Self::ClusterUnreachable { .. } | Self::ClusterAuth { .. } | Self::CommandFailed { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingJobFullName => Some("Pass --job, or register the job annotation provider"),
            Self::NoCloudsConfigured => Some("Add a [[clouds]] table to the config file"),
            Self::CloudNotFound(_) => Some("Run: jobpvc config show"),
            Self::ClusterAuth { .. } => Some("Check the kubeconfig credentials for this cloud"),
            Self::ClusterUnreachable { .. } => Some("Check the cloud context and API server address"),
            _ => None,
        }
    }
}
