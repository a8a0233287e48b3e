//! Provision and cleanup through the library API against in-memory clouds

use async_trait::async_trait;
use jobpvc::annotation::{collect_for_run, default_providers, RunContext};
use jobpvc::cluster::{ClientFactory, ClusterClient};
use jobpvc::config::CloudConfig;
use jobpvc::env::EnvSnapshot;
use jobpvc::reconcile::{CleanupStatus, ItemEvent, Reconciler};
use jobpvc::volume::{DynamicJobVolume, PersistentVolumeClaim, PodMetadata, ProvisionOutcome};
use jobpvc::{JobPvcError, JobPvcResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
struct MemoryCloud {
    name: String,
    namespace: String,
    claims: Arc<Mutex<Vec<PersistentVolumeClaim>>>,
}

impl MemoryCloud {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: "ci".to_string(),
            claims: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn names(&self) -> Vec<String> {
        self.claims
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    fn config(&self) -> CloudConfig {
        CloudConfig::new(&self.name, &self.namespace)
    }
}

#[async_trait]
impl ClusterClient for MemoryCloud {
    fn cloud_name(&self) -> &str {
        &self.name
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn list_claims(&self, namespace: &str) -> JobPvcResult<Vec<PersistentVolumeClaim>> {
        Ok(self
            .claims
            .lock()
            .unwrap()
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
        let mut claims = self.claims.lock().unwrap();
        if claims.iter().any(|c| c.name() == claim.name()) {
            return Err(JobPvcError::VolumeConflict(claim.name().to_string()));
        }
        let mut stored = claim.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        claims.push(stored.clone());
        Ok(stored)
    }

    async fn delete_claim(&self, claim: &PersistentVolumeClaim) -> JobPvcResult<bool> {
        let mut claims = self.claims.lock().unwrap();
        let before = claims.len();
        claims.retain(|c| c.name() != claim.name());
        Ok(claims.len() < before)
    }
}

#[derive(Default)]
struct MemoryFactory {
    clouds: HashMap<String, MemoryCloud>,
}

impl MemoryFactory {
    fn with(clouds: &[&MemoryCloud]) -> Self {
        Self {
            clouds: clouds
                .iter()
                .map(|c| (c.name.clone(), (*c).clone()))
                .collect(),
        }
    }
}

impl ClientFactory for MemoryFactory {
    fn create_client(&self, cloud: &CloudConfig) -> JobPvcResult<Box<dyn ClusterClient>> {
        self.clouds
            .get(&cloud.name)
            .map(|c| Box::new(c.clone()) as Box<dyn ClusterClient>)
            .ok_or_else(|| JobPvcError::ClusterUnreachable {
                cloud: cloud.name.clone(),
                reason: "connection refused".to_string(),
            })
    }
}

async fn provision(cloud: &MemoryCloud, job: &str) -> ProvisionOutcome {
    let annotations = collect_for_run(&default_providers(), &RunContext::new(job, 1));
    let mut volume = DynamicJobVolume::new();
    volume.process_annotations(&annotations).unwrap();

    let pod = PodMetadata::new("agent-1", &cloud.namespace);
    volume
        .provision(cloud, &pod, &EnvSnapshot::new())
        .await
        .unwrap()
        .outcome
}

fn event(json: &str) -> ItemEvent {
    serde_json::from_str(json).unwrap()
}

#[tokio::test]
async fn delete_then_recreate_job() {
    let cloud = MemoryCloud::new("prod");
    let factory = MemoryFactory::with(&[&cloud]);
    let clouds = vec![cloud.config()];

    assert_eq!(provision(&cloud, "proj/app").await, ProvisionOutcome::Created);
    assert_eq!(provision(&cloud, "proj/app").await, ProvisionOutcome::Reused);
    assert_eq!(cloud.names(), vec!["pvc-proj-app"]);

    let report = Reconciler::new(&clouds, &factory)
        .handle(&event(
            r#"{"event":"deleted","item":{"kind":"job","full_name":"proj/app"}}"#,
        ))
        .await
        .unwrap();
    assert_eq!(report.deleted_count(), 1);
    assert!(cloud.names().is_empty());

    // A job recreated under the same name gets a fresh claim
    assert_eq!(provision(&cloud, "proj/app").await, ProvisionOutcome::Created);
}

#[tokio::test]
async fn folder_rename_removes_claims_under_old_names() {
    let cloud = MemoryCloud::new("prod");
    let factory = MemoryFactory::with(&[&cloud]);
    let clouds = vec![cloud.config()];

    provision(&cloud, "old-org/app").await;
    provision(&cloud, "old-org/team/lib").await;
    provision(&cloud, "other/app").await;

    let report = Reconciler::new(&clouds, &factory)
        .handle(&event(
            r#"{
                "event": "renamed",
                "item": {
                    "kind": "folder",
                    "full_name": "org",
                    "children": [
                        {"kind": "job", "full_name": "org/app"},
                        {"kind": "folder", "full_name": "org/team", "children": [
                            {"kind": "job", "full_name": "org/team/lib"}
                        ]}
                    ]
                },
                "old_name": "old-org",
                "new_name": "org"
            }"#,
        ))
        .await
        .unwrap();

    assert_eq!(report.deleted_count(), 2);
    assert_eq!(cloud.names(), vec!["pvc-other-app"]);
}

#[tokio::test]
async fn unreachable_cloud_does_not_block_others() {
    let prod = MemoryCloud::new("prod");
    let staging = MemoryCloud::new("staging");
    provision(&prod, "proj/app").await;
    provision(&staging, "proj/app").await;

    // "dr" is configured but never answers
    let factory = MemoryFactory::with(&[&prod, &staging]);
    let clouds = vec![
        prod.config(),
        CloudConfig::new("dr", "ci"),
        staging.config(),
    ];

    let report = Reconciler::new(&clouds, &factory)
        .handle(&event(
            r#"{"event":"location_changed","item":{"kind":"job","full_name":"new/app"},"old_full_name":"proj/app","new_full_name":"new/app"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(report.outcomes.len(), 3);
    assert_eq!(report.deleted_count(), 2);
    assert!(matches!(
        report.outcomes[1].status,
        CleanupStatus::Unreachable(_)
    ));
    assert!(!report.is_clean());
    assert!(prod.names().is_empty());
    assert!(staging.names().is_empty());
}

#[tokio::test]
async fn caller_errors_touch_no_cloud() {
    let cloud = MemoryCloud::new("prod");
    provision(&cloud, "proj/app").await;
    let factory = MemoryFactory::with(&[&cloud]);
    let clouds = vec![cloud.config()];

    let err = Reconciler::new(&clouds, &factory)
        .handle(&event(
            r#"{"event":"renamed","item":{"kind":"job","full_name":"proj/app"},"old_name":" "}"#,
        ))
        .await
        .unwrap_err();

    assert!(err.is_caller_error());
    assert_eq!(cloud.names(), vec!["pvc-proj-app"]);
}
