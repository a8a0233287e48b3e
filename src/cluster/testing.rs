//! In-memory cluster used by unit tests

use crate::cluster::{ClientFactory, ClusterClient};
use crate::config::CloudConfig;
use crate::error::{JobPvcError, JobPvcResult};
use crate::volume::PersistentVolumeClaim;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A recorded client call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Create(String),
    Delete(String),
}

#[derive(Default)]
struct State {
    claims: Vec<PersistentVolumeClaim>,
    calls: Vec<Call>,
    unreachable: bool,
    conflict_on_create: bool,
    conflict_without_claim: bool,
    reject_delete: bool,
    delete_error: Option<String>,
}

/// Shared in-memory backend; clones see the same claims
#[derive(Clone)]
pub struct FakeCluster {
    name: String,
    namespace: String,
    state: Arc<Mutex<State>>,
}

impl FakeCluster {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Every call fails as if the API server were down
    pub fn set_unreachable(&self) {
        self.state().unreachable = true;
    }

    /// Creates lose a race: the claim appears, but create reports a conflict
    pub fn set_conflict_on_create(&self) {
        self.state().conflict_on_create = true;
    }

    /// Creates report a conflict, but the claim never shows up in a list
    pub fn set_conflict_without_claim(&self) {
        self.state().conflict_without_claim = true;
    }

    /// Deletes fail with a server-side error carrying this stderr
    pub fn set_delete_error(&self, stderr: &str) {
        self.state().delete_error = Some(stderr.to_string());
    }

    /// Deletes are answered with "not deleted"
    pub fn set_reject_delete(&self) {
        self.state().reject_delete = true;
    }

    /// Seed an existing claim
    pub fn insert(&self, name: &str, namespace: &str) {
        let mut claim: PersistentVolumeClaim = serde_json::from_value(serde_json::json!({
            "metadata": {"name": name}
        }))
        .unwrap();
        claim.metadata.namespace = Some(namespace.to_string());
        self.state().claims.push(claim);
    }

    /// Seed an existing claim owned by a job
    pub fn insert_for_job(&self, name: &str, namespace: &str, job_full_name: &str) {
        self.insert(name, namespace);
        let mut state = self.state();
        if let Some(claim) = state.claims.last_mut() {
            claim.metadata.annotations.insert(
                crate::volume::claim::annotations::JOB_FULL_NAME.to_string(),
                job_full_name.to_string(),
            );
        }
    }

    pub fn claim_names(&self) -> Vec<String> {
        self.state()
            .claims
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn create_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count()
    }

    fn unreachable_error(&self) -> JobPvcError {
        JobPvcError::ClusterUnreachable {
            cloud: self.name.clone(),
            reason: "connection refused".to_string(),
        }
    }
}

#[async_trait]
impl ClusterClient for FakeCluster {
    fn cloud_name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn list_claims(&self, namespace: &str) -> JobPvcResult<Vec<PersistentVolumeClaim>> {
        let mut state = self.state();
        if state.unreachable {
            return Err(self.unreachable_error());
        }
        state.calls.push(Call::List(namespace.to_string()));
        Ok(state
            .claims
            .iter()
            .filter(|c| c.namespace() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn create_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> JobPvcResult<PersistentVolumeClaim> {
        let mut state = self.state();
        if state.unreachable {
            return Err(self.unreachable_error());
        }
        state.calls.push(Call::Create(claim.name().to_string()));

        let mut stored = claim.clone();
        stored.metadata.namespace = Some(namespace.to_string());

        let exists = state
            .claims
            .iter()
            .any(|c| c.name() == claim.name() && c.namespace() == Some(namespace));
        if state.conflict_without_claim {
            return Err(JobPvcError::VolumeConflict(claim.name().to_string()));
        }
        if state.conflict_on_create {
            if !exists {
                state.claims.push(stored);
            }
            return Err(JobPvcError::VolumeConflict(claim.name().to_string()));
        }
        if exists {
            return Err(JobPvcError::VolumeConflict(claim.name().to_string()));
        }

        state.claims.push(stored.clone());
        Ok(stored)
    }

    async fn delete_claim(&self, claim: &PersistentVolumeClaim) -> JobPvcResult<bool> {
        let mut state = self.state();
        if state.unreachable {
            return Err(self.unreachable_error());
        }
        state.calls.push(Call::Delete(claim.name().to_string()));
        if let Some(stderr) = &state.delete_error {
            return Err(JobPvcError::command_exec("kubectl delete pvc", stderr.as_str()));
        }
        if state.reject_delete {
            return Ok(false);
        }

        let before = state.claims.len();
        state
            .claims
            .retain(|c| !(c.name() == claim.name() && c.namespace() == claim.namespace()));
        Ok(state.claims.len() < before)
    }
}

/// Hands out registered fake clusters by cloud name
#[derive(Default)]
pub struct FakeFactory {
    clusters: HashMap<String, FakeCluster>,
    broken: Vec<String>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, cluster: &FakeCluster) {
        self.clusters.insert(cluster.name.clone(), cluster.clone());
    }

    /// Client creation for this cloud fails, like bad credentials
    pub fn break_cloud(&mut self, name: &str) {
        self.broken.push(name.to_string());
    }
}

impl ClientFactory for FakeFactory {
    fn create_client(&self, cloud: &CloudConfig) -> JobPvcResult<Box<dyn ClusterClient>> {
        if self.broken.contains(&cloud.name) {
            return Err(JobPvcError::ClusterAuth {
                cloud: cloud.name.clone(),
                reason: "token expired".to_string(),
            });
        }

        self.clusters
            .get(&cloud.name)
            .map(|c| Box::new(c.clone()) as Box<dyn ClusterClient>)
            .ok_or_else(|| JobPvcError::CloudNotFound(cloud.name.clone()))
    }
}
