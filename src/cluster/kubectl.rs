//! kubectl-backed cluster client
//!
//! Implements the ClusterClient trait by running `kubectl` with the
//! context, kubeconfig and timeout of one configured cloud.

use crate::cluster::client::{ClientFactory, ClusterClient};
use crate::config::CloudConfig;
use crate::error::{JobPvcError, JobPvcResult};
use crate::volume::{ClaimList, PersistentVolumeClaim};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Cluster client that shells out to kubectl
pub struct KubectlClient {
    cloud: CloudConfig,
}

/// How a failed kubectl call should be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Auth,
    Unreachable,
    Conflict,
    NotFound,
    Other,
}

fn classify(stderr: &str) -> Failure {
    let lower = stderr.to_lowercase();

    if lower.contains("alreadyexists") || lower.contains("already exists") {
        Failure::Conflict
    } else if lower.contains("notfound") && !lower.contains("context") {
        Failure::NotFound
    } else if lower.contains("unauthorized")
        || lower.contains("forbidden")
        || lower.contains("you must be logged in")
    {
        Failure::Auth
    } else if lower.contains("unable to connect")
        || lower.contains("connection refused")
        || lower.contains("no such host")
        || lower.contains("i/o timeout")
        || lower.contains("context deadline exceeded")
        || lower.contains("context was not found")
        || lower.contains("does not exist")
    {
        Failure::Unreachable
    } else {
        Failure::Other
    }
}

impl KubectlClient {
    /// Create a client for a cloud
    pub fn new(cloud: CloudConfig) -> Self {
        Self { cloud }
    }

    /// Connection flags shared by every call
    fn base_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if let Some(ref kubeconfig) = self.cloud.kubeconfig {
            args.push("--kubeconfig".to_string());
            args.push(kubeconfig.display().to_string());
        }
        if let Some(ref context) = self.cloud.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        if let Some(secs) = self.cloud.request_timeout_secs {
            args.push(format!("--request-timeout={}s", secs));
        }

        args
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.cloud.kubectl);
        cmd.args(self.base_args())
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    /// Execute a kubectl command and return the output
    async fn exec(&self, args: &[&str]) -> JobPvcResult<std::process::Output> {
        debug!("Executing on {}: kubectl {:?}", self.cloud.name, args);

        self.command(args)
            .output()
            .await
            .map_err(|e| JobPvcError::command_failed(format!("kubectl {:?}", args), e))
    }

    /// Execute a kubectl command with `input` on stdin
    async fn exec_with_input(&self, args: &[&str], input: &[u8]) -> JobPvcResult<std::process::Output> {
        debug!("Executing on {}: kubectl {:?} (stdin)", self.cloud.name, args);

        let mut cmd = self.command(args);
        cmd.stdin(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| JobPvcError::command_failed(format!("kubectl {:?}", args), e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input)
                .await
                .map_err(|e| JobPvcError::io("writing claim to kubectl", e))?;
            stdin
                .shutdown()
                .await
                .map_err(|e| JobPvcError::io("closing kubectl stdin", e))?;
        }

        child
            .wait_with_output()
            .await
            .map_err(|e| JobPvcError::command_failed(format!("kubectl {:?}", args), e))
    }

    /// Map a failed call to an error
    fn failure(&self, command: &str, stderr: &str) -> JobPvcError {
        match classify(stderr) {
            Failure::Auth => JobPvcError::ClusterAuth {
                cloud: self.cloud.name.clone(),
                reason: stderr.trim().to_string(),
            },
            Failure::Unreachable => JobPvcError::ClusterUnreachable {
                cloud: self.cloud.name.clone(),
                reason: stderr.trim().to_string(),
            },
            _ => JobPvcError::command_exec(command, stderr.trim()),
        }
    }
}

#[async_trait]
impl ClusterClient for KubectlClient {
    fn cloud_name(&self) -> &str {
        &self.cloud.name
    }

    fn namespace(&self) -> &str {
        &self.cloud.namespace
    }

    async fn list_claims(&self, namespace: &str) -> JobPvcResult<Vec<PersistentVolumeClaim>> {
        let output = self
            .exec(&["get", "pvc", "-n", namespace, "-o", "json"])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.failure("kubectl get pvc", &stderr));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(Vec::new());
        }

        let list: ClaimList = serde_json::from_str(&stdout)?;
        Ok(list.items)
    }

    async fn create_claim(
        &self,
        namespace: &str,
        claim: &PersistentVolumeClaim,
    ) -> JobPvcResult<PersistentVolumeClaim> {
        let body = serde_json::to_vec(claim)?;
        let output = self
            .exec_with_input(&["create", "-n", namespace, "-f", "-", "-o", "json"], &body)
            .await?;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Ok(serde_json::from_str(&stdout)?);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        match classify(&stderr) {
            Failure::Conflict => Err(JobPvcError::VolumeConflict(claim.name().to_string())),
            _ => Err(self.failure("kubectl create pvc", &stderr)),
        }
    }

    async fn delete_claim(&self, claim: &PersistentVolumeClaim) -> JobPvcResult<bool> {
        let namespace = claim.namespace().unwrap_or(&self.cloud.namespace);
        let output = self
            .exec(&["delete", "pvc", claim.name(), "-n", namespace, "--wait=false"])
            .await?;

        if output.status.success() {
            return Ok(true);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        match classify(&stderr) {
            Failure::NotFound => {
                debug!("Claim {} already gone: {}", claim.name(), stderr.trim());
                Ok(false)
            }
            _ => Err(self.failure("kubectl delete pvc", &stderr)),
        }
    }
}

/// Creates a fresh kubectl client per cloud
#[derive(Debug, Clone, Copy, Default)]
pub struct KubectlClientFactory;

impl ClientFactory for KubectlClientFactory {
    fn create_client(&self, cloud: &CloudConfig) -> JobPvcResult<Box<dyn ClusterClient>> {
        if let Some(ref kubeconfig) = cloud.kubeconfig {
            if !kubeconfig.exists() {
                return Err(JobPvcError::ClusterUnreachable {
                    cloud: cloud.name.clone(),
                    reason: format!("kubeconfig not found: {}", kubeconfig.display()),
                });
            }
        }

        Ok(Box::new(KubectlClient::new(cloud.clone())))
    }
}
