//! Dynamic per-job workspace volume
//!
//! A job's workspace lives in a claim named after the job. The claim is
//! created on the first build and reused by every later build of the
//! same job until the job is deleted, renamed or moved.

use crate::annotation::{find_annotation, keys, Annotation};
use crate::cluster::ClusterClient;
use crate::config::VolumeConfig;
use crate::env::{resolve_quantity, EnvSnapshot};
use crate::error::{JobPvcError, JobPvcResult};
use crate::naming::normalize_job_name;
use crate::volume::claim::{
    annotations, AccessMode, ClaimSpec, ClaimVolumeSource, ObjectMeta, PersistentVolumeClaim,
    PodVolume, ResourceRequirements, STORAGE_RESOURCE,
};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

/// Size requested when none is configured
pub const DEFAULT_REQUESTS_SIZE: &str = "10Gi";

/// Treat empty or blank strings as unset
fn fix_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Pod the volume is being built for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodMetadata {
    pub name: String,
    pub namespace: String,
}

impl PodMetadata {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Whether provisioning created the claim or found it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    Created,
    Reused,
}

impl fmt::Display for ProvisionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Reused => write!(f, "reused"),
        }
    }
}

/// Result of provisioning a job volume
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub claim: PersistentVolumeClaim,
    pub outcome: ProvisionOutcome,
}

/// Operator settings plus the job the volume is for
#[derive(Debug, Clone, Default)]
pub struct DynamicJobVolume {
    storage_class_name: Option<String>,
    requests_size: Option<String>,
    access_modes: Option<String>,
    job_full_name: Option<String>,
}

impl DynamicJobVolume {
    /// Volume with all settings at their defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Volume with explicit settings
    pub fn with_settings(
        storage_class_name: Option<String>,
        requests_size: Option<String>,
        access_modes: Option<String>,
    ) -> Self {
        let mut volume = Self::new();
        volume.set_storage_class_name(storage_class_name);
        volume.set_requests_size(requests_size);
        volume.set_access_modes(access_modes);
        volume
    }

    /// Volume seeded from the `[volume]` config table
    pub fn from_config(config: &VolumeConfig) -> Self {
        Self::with_settings(
            config.storage_class.clone(),
            config.requests_size.clone(),
            config.access_modes.clone(),
        )
    }

    pub fn storage_class_name(&self) -> Option<&str> {
        self.storage_class_name.as_deref()
    }

    pub fn set_storage_class_name(&mut self, value: Option<String>) {
        self.storage_class_name = fix_empty(value);
    }

    pub fn requests_size(&self) -> Option<&str> {
        self.requests_size.as_deref()
    }

    pub fn set_requests_size(&mut self, value: Option<String>) {
        self.requests_size = fix_empty(value);
    }

    pub fn access_modes(&self) -> Option<&str> {
        self.access_modes.as_deref()
    }

    pub fn set_access_modes(&mut self, value: Option<String>) {
        self.access_modes = fix_empty(value);
    }

    /// Storage class, `None` meaning the cluster default
    pub fn storage_class_name_or_default(&self) -> Option<&str> {
        self.storage_class_name()
    }

    pub fn requests_size_or_default(&self) -> &str {
        self.requests_size().unwrap_or(DEFAULT_REQUESTS_SIZE)
    }

    pub fn access_mode_or_default(&self) -> JobPvcResult<AccessMode> {
        match self.access_modes() {
            Some(mode) => mode.parse(),
            None => Ok(AccessMode::default()),
        }
    }

    /// Job recorded by [`process_annotations`](Self::process_annotations)
    pub fn job_full_name(&self) -> Option<&str> {
        self.job_full_name.as_deref()
    }

    /// Take the job full name from the run's annotations
    ///
    /// The first `jobFullName` annotation wins. Its absence means the
    /// caller did not run the job annotation provider.
    pub fn process_annotations(&mut self, annotations: &[Annotation]) -> JobPvcResult<()> {
        let annotation = find_annotation(annotations, keys::JOB_FULL_NAME)
            .ok_or(JobPvcError::MissingJobFullName)?;
        self.job_full_name = Some(annotation.value().to_string());
        Ok(())
    }

    fn require_job_full_name(&self) -> JobPvcResult<&str> {
        self.job_full_name
            .as_deref()
            .ok_or(JobPvcError::MissingJobFullName)
    }

    /// Claim name for the current job
    pub fn claim_name(&self) -> JobPvcResult<String> {
        normalize_job_name(self.require_job_full_name()?)
    }

    /// Pod volume mounting the job's claim
    pub fn build_volume(&self, volume_name: &str, pod_name: &str) -> JobPvcResult<PodVolume> {
        let claim_name = self.claim_name()?;
        debug!(
            "Building volume {} for pod {} from claim {}",
            volume_name, pod_name, claim_name
        );

        Ok(PodVolume {
            name: volume_name.to_string(),
            persistent_volume_claim: ClaimVolumeSource {
                claim_name,
                read_only: false,
            },
        })
    }

    /// Claim spec for the current job
    pub fn build_claim(&self, namespace: &str, env: &EnvSnapshot) -> JobPvcResult<PersistentVolumeClaim> {
        let job_full_name = self.require_job_full_name()?;
        let name = normalize_job_name(job_full_name)?;
        let access_mode = self.access_mode_or_default()?;
        let storage = resolve_quantity(self.requests_size_or_default(), env)?;

        let mut claim_annotations = BTreeMap::new();
        claim_annotations.insert(
            annotations::JOB_FULL_NAME.to_string(),
            job_full_name.to_string(),
        );

        let mut requests = BTreeMap::new();
        requests.insert(STORAGE_RESOURCE.to_string(), storage);

        Ok(PersistentVolumeClaim {
            api_version: "v1".to_string(),
            kind: "PersistentVolumeClaim".to_string(),
            metadata: ObjectMeta {
                name,
                namespace: Some(namespace.to_string()),
                annotations: claim_annotations,
            },
            spec: ClaimSpec {
                access_modes: vec![access_mode.as_str().to_string()],
                resources: ResourceRequirements { requests },
                storage_class_name: self.storage_class_name_or_default().map(String::from),
            },
        })
    }

    /// Create the job's claim, or reuse the one that already exists
    ///
    /// Lists before creating, so at most one create is issued per call.
    /// An existing claim is returned as-is: its size, access mode and
    /// storage class are NOT updated to match changed settings. Keep it
    /// that way unless resizing becomes a deliberate feature.
    ///
    /// A create that loses a race against a concurrent call (conflict)
    /// is reported as a reuse.
    pub async fn provision(
        &self,
        client: &dyn ClusterClient,
        pod: &PodMetadata,
        env: &EnvSnapshot,
    ) -> JobPvcResult<Provisioned> {
        let job_full_name = self.require_job_full_name()?;
        let claim_name = normalize_job_name(job_full_name)?;
        let namespace = pod.namespace.as_str();

        debug!(
            "Adding workspace volume {} for pod {}/{} on {}",
            claim_name,
            namespace,
            pod.name,
            client.cloud_name()
        );

        // Settings are validated before touching the cluster
        let spec = self.build_claim(namespace, env)?;

        if let Some(existing) = find_claim(client, namespace, &claim_name).await? {
            info!(
                "Reused PVC: {}/{} for job {}",
                namespace, claim_name, job_full_name
            );
            return Ok(Provisioned {
                claim: existing,
                outcome: ProvisionOutcome::Reused,
            });
        }

        match client.create_claim(namespace, &spec).await {
            Ok(created) => {
                info!(
                    "Created PVC: {}/{} for job {}",
                    namespace,
                    created.name(),
                    job_full_name
                );
                Ok(Provisioned {
                    claim: created,
                    outcome: ProvisionOutcome::Created,
                })
            }
            Err(JobPvcError::VolumeConflict(_)) => {
                info!(
                    "Reused PVC: {}/{} for job {} (created concurrently)",
                    namespace, claim_name, job_full_name
                );
                let claim = find_claim(client, namespace, &claim_name)
                    .await?
                    .unwrap_or(spec);
                Ok(Provisioned {
                    claim,
                    outcome: ProvisionOutcome::Reused,
                })
            }
            Err(e) => Err(e),
        }
    }
}

/// Equality covers the operator settings only, not the job
impl PartialEq for DynamicJobVolume {
    fn eq(&self, other: &Self) -> bool {
        self.storage_class_name == other.storage_class_name
            && self.requests_size == other.requests_size
            && self.access_modes == other.access_modes
    }
}

impl Eq for DynamicJobVolume {}

async fn find_claim(
    client: &dyn ClusterClient,
    namespace: &str,
    claim_name: &str,
) -> JobPvcResult<Option<PersistentVolumeClaim>> {
    let claims = client.list_claims(namespace).await?;
    Ok(claims.into_iter().find(|c| c.name() == claim_name))
}
