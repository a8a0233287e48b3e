//! Claim cleanup on identity-changing events
//!
//! There is no index from job to cloud, so every configured cloud is
//! searched for the claim. A cloud that cannot be reached is logged and
//! skipped; it never stops the cleanup on the others.

use crate::cluster::ClientFactory;
use crate::config::CloudConfig;
use crate::error::{JobPvcError, JobPvcResult};
use crate::naming::normalize_job_name;
use crate::reconcile::item::{rebase, replace_last_segment, Item, ItemEvent};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Result of cleaning one job's claim on one cloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum CleanupStatus {
    /// The claim was found and deleted
    Deleted,
    /// No claim with that name on this cloud
    NotFound,
    /// The backend answered but did not delete the claim
    DeleteRejected,
    /// The cloud could not be reached; the claim may be left over
    Unreachable(String),
}

impl fmt::Display for CleanupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => write!(f, "deleted"),
            Self::NotFound => write!(f, "not found"),
            Self::DeleteRejected => write!(f, "delete rejected"),
            Self::Unreachable(reason) => write!(f, "unreachable: {}", reason),
        }
    }
}

/// Per-cloud cleanup record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanupOutcome {
    pub job_full_name: String,
    pub claim_name: String,
    pub cloud: String,
    pub namespace: String,
    #[serde(flatten)]
    pub status: CleanupStatus,
}

/// Everything a cleanup run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub outcomes: Vec<CleanupOutcome>,
}

impl CleanupReport {
    /// Number of claims deleted
    pub fn deleted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == CleanupStatus::Deleted)
            .count()
    }

    /// Outcomes that may have left a claim behind
    pub fn failures(&self) -> Vec<&CleanupOutcome> {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    CleanupStatus::DeleteRejected | CleanupStatus::Unreachable(_)
                )
            })
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Full names whose claims an event invalidates
///
/// - deleted job: its own name
/// - renamed job: its name with the old last segment
/// - renamed container: every descendant job, rebased under the
///   container's old name
/// - moved job: the old full name
///
/// Deleted or moved containers yield nothing; the host reports each
/// affected job on its own.
pub fn affected_jobs(event: &ItemEvent) -> JobPvcResult<Vec<String>> {
    match event {
        ItemEvent::Deleted { item } => match item {
            Item::Job { full_name } => Ok(vec![full_name.clone()]),
            Item::Container { full_name, .. } => {
                debug!("Ignoring deletion of container {}", full_name);
                Ok(Vec::new())
            }
        },

        ItemEvent::Renamed { item, old_name, .. } => {
            if old_name.trim().is_empty() {
                return Err(JobPvcError::InvalidEvent(format!(
                    "rename of {} has an empty old name",
                    item.full_name()
                )));
            }

            let old_full_name = replace_last_segment(item.full_name(), old_name);
            match item {
                Item::Job { .. } => Ok(vec![old_full_name]),
                Item::Container { full_name, .. } => {
                    let mut jobs = Vec::new();
                    for job in item.descendant_jobs() {
                        match rebase(job.full_name(), full_name, &old_full_name) {
                            Some(old) => jobs.push(old),
                            None => warn!(
                                "Skipping {}: not under renamed container {}",
                                job.full_name(),
                                full_name
                            ),
                        }
                    }
                    Ok(jobs)
                }
            }
        }

        ItemEvent::LocationChanged {
            item,
            old_full_name,
            ..
        } => match item {
            Item::Job { .. } => Ok(vec![old_full_name.clone()]),
            Item::Container { full_name, .. } => {
                debug!("Ignoring move of container {}", full_name);
                Ok(Vec::new())
            }
        },
    }
}

/// Deletes job claims across every configured cloud
pub struct Reconciler<'a> {
    clouds: &'a [CloudConfig],
    factory: &'a dyn ClientFactory,
}

impl<'a> Reconciler<'a> {
    pub fn new(clouds: &'a [CloudConfig], factory: &'a dyn ClientFactory) -> Self {
        Self { clouds, factory }
    }

    /// Handle one event
    ///
    /// Only caller errors (empty names, malformed event) are returned,
    /// and they are detected before any cloud is contacted. Cloud
    /// failures end up in the report.
    pub async fn handle(&self, event: &ItemEvent) -> JobPvcResult<CleanupReport> {
        let jobs = affected_jobs(event)?;

        let targets = jobs
            .into_iter()
            .map(|job| normalize_job_name(&job).map(|claim| (job, claim)))
            .collect::<JobPvcResult<Vec<_>>>()?;

        debug!(
            "Event {} on {} affects {} job(s)",
            event.kind(),
            event.item().full_name(),
            targets.len()
        );

        let mut report = CleanupReport::default();
        for (job, claim) in &targets {
            report
                .outcomes
                .extend(self.delete_on_all_clouds(job, claim).await);
        }

        Ok(report)
    }

    /// Delete one job's claim from every cloud
    pub async fn delete_everywhere(&self, job_full_name: &str) -> JobPvcResult<Vec<CleanupOutcome>> {
        let claim_name = normalize_job_name(job_full_name)?;
        Ok(self.delete_on_all_clouds(job_full_name, &claim_name).await)
    }

    async fn delete_on_all_clouds(&self, job_full_name: &str, claim_name: &str) -> Vec<CleanupOutcome> {
        let mut outcomes = Vec::with_capacity(self.clouds.len());
        for cloud in self.clouds {
            let (namespace, status) = self.delete_on_cloud(cloud, job_full_name, claim_name).await;
            outcomes.push(CleanupOutcome {
                job_full_name: job_full_name.to_string(),
                claim_name: claim_name.to_string(),
                cloud: cloud.name.clone(),
                namespace,
                status,
            });
        }
        outcomes
    }

    /// Returns the namespace the claim was looked up in, with the status
    async fn delete_on_cloud(
        &self,
        cloud: &CloudConfig,
        job_full_name: &str,
        claim_name: &str,
    ) -> (String, CleanupStatus) {
        let leftover = |namespace: &str, e: JobPvcError| {
            error!(
                "Failed to connect to cloud {}. There may be leftover resources on the cluster: PVC {} in namespace {} for job {} ({})",
                cloud.name, claim_name, namespace, job_full_name, e
            );
            (namespace.to_string(), CleanupStatus::Unreachable(e.to_string()))
        };

        let client = match self.factory.create_client(cloud) {
            Ok(client) => client,
            Err(e) => return leftover(&cloud.namespace, e),
        };

        let claims = match client.list_claims(client.namespace()).await {
            Ok(claims) => claims,
            Err(e) => return leftover(client.namespace(), e),
        };

        let Some(claim) = claims.into_iter().find(|c| c.name() == claim_name) else {
            debug!("No PVC {} on cloud {}", claim_name, cloud.name);
            return (client.namespace().to_string(), CleanupStatus::NotFound);
        };

        let namespace = claim.namespace().unwrap_or(client.namespace()).to_string();
        let rejected = |reason: &dyn fmt::Display| {
            warn!(
                "Failed to remove PVC {} in namespace {} for job {} on cloud {}: {}",
                claim_name, namespace, job_full_name, cloud.name, reason
            );
            CleanupStatus::DeleteRejected
        };

        let status = match client.delete_claim(&claim).await {
            Ok(true) => {
                info!(
                    "Removed PVC {} in namespace {} for job {} on cloud {}",
                    claim_name, namespace, job_full_name, cloud.name
                );
                CleanupStatus::Deleted
            }
            Ok(false) => rejected(&"not deleted"),
            Err(e) if e.is_connectivity_error() => return leftover(&namespace, e),
            // The backend answered and refused
            Err(e) if e.is_cluster_error() => rejected(&e),
            Err(e) => return leftover(&namespace, e),
        };

        (namespace, status)
    }
}
