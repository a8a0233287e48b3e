//! PersistentVolumeClaim wire model
//!
//! Serialized field-for-field as the cluster API expects it, so the same
//! types are used for `kubectl create -f -` input and `kubectl get -o json`
//! output. Unknown fields (status, managed fields, ...) are ignored.

use crate::error::JobPvcError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Claim annotation keys
pub mod annotations {
    /// Records the job that owns the claim
    pub const JOB_FULL_NAME: &str = "jenkins/job-full-name";
}

/// Key of the storage request in `spec.resources.requests`
pub const STORAGE_RESOURCE: &str = "storage";

/// Volume access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    ReadWriteOnce,
    ReadOnlyMany,
    ReadWriteMany,
}

impl AccessMode {
    /// All supported access modes
    pub const ALL: [AccessMode; 3] = [
        AccessMode::ReadWriteOnce,
        AccessMode::ReadOnlyMany,
        AccessMode::ReadWriteMany,
    ];

    /// Literal used by the cluster API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadWriteOnce => "ReadWriteOnce",
            Self::ReadOnlyMany => "ReadOnlyMany",
            Self::ReadWriteMany => "ReadWriteMany",
        }
    }
}

impl Default for AccessMode {
    fn default() -> Self {
        Self::ReadWriteOnce
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = JobPvcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s.trim())
            .ok_or_else(|| JobPvcError::InvalidAccessMode(s.to_string()))
    }
}

/// Object metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Resource requests of a claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
}

/// Claim spec
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimSpec {
    /// Access mode literals; kept as strings so claims with modes this
    /// tool never writes (e.g. ReadWriteOncePod) still parse
    #[serde(default)]
    pub access_modes: Vec<String>,

    #[serde(default)]
    pub resources: ResourceRequirements,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class_name: Option<String>,
}

/// A PersistentVolumeClaim resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaim {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: ClaimSpec,
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_kind() -> String {
    "PersistentVolumeClaim".to_string()
}

impl PersistentVolumeClaim {
    /// Claim name
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Claim namespace, if known
    pub fn namespace(&self) -> Option<&str> {
        self.metadata.namespace.as_deref()
    }

    /// Job recorded in the provenance annotation
    pub fn job_full_name(&self) -> Option<&str> {
        self.metadata
            .annotations
            .get(annotations::JOB_FULL_NAME)
            .map(String::as_str)
    }

    /// Requested storage quantity
    pub fn storage_request(&self) -> Option<&str> {
        self.spec
            .resources
            .requests
            .get(STORAGE_RESOURCE)
            .map(String::as_str)
    }
}

/// List response of `kubectl get pvc -o json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimList {
    #[serde(default)]
    pub items: Vec<PersistentVolumeClaim>,
}

/// Pod volume source referencing a claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimVolumeSource {
    pub claim_name: String,
    pub read_only: bool,
}

/// A pod-level volume mounting a job claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodVolume {
    pub name: String,
    pub persistent_volume_claim: ClaimVolumeSource,
}
