//! Cluster client abstraction
//!
//! Provides traits for the claim operations jobpvc needs, so the
//! provisioner and the reconciler can run against kubectl in production
//! and against a fake in tests.

use crate::config::CloudConfig;
use crate::error::JobPvcResult;
use crate::volume::PersistentVolumeClaim;
use async_trait::async_trait;

/// Claim operations against one cluster backend
///
/// Every call is a blocking round trip to the cluster from the caller's
/// point of view. Implementations apply their own request timeout.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Name of the cloud this client talks to
    fn cloud_name(&self) -> &str;

    /// Namespace configured for the cloud
    fn namespace(&self) -> &str;

    /// List claims in a namespace
    async fn list_claims(&self, namespace: &str) -> JobPvcResult<Vec<PersistentVolumeClaim>>;

    /// Create a claim, returning the stored resource
    ///
    /// Fails with `VolumeConflict` when a claim with the same name exists.
    async fn create_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> JobPvcResult<PersistentVolumeClaim>;

    /// Delete a claim
    ///
    /// Returns `false` when the backend answered but did not delete it.
    async fn delete_claim(&self, claim: &PersistentVolumeClaim) -> JobPvcResult<bool>;
}

/// Creates a client for a configured cloud
///
/// Called once per cloud per operation; implementations decide whether
/// to cache.
pub trait ClientFactory: Send + Sync {
    fn create_client(&self, cloud: &CloudConfig) -> JobPvcResult<Box<dyn ClusterClient>>;
}
