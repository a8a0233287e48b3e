//! Audit logging for volume lifecycle events
//!
//! Writes JSON lines to `~/.local/state/jobpvc/audit.log`: every claim
//! created, reused or deleted, and every cloud that could not be cleaned.

use crate::config::{schema::Config, ConfigManager};
use crate::reconcile::{CleanupReport, CleanupStatus};
use crate::volume::{ProvisionOutcome, Provisioned};
use chrono::Utc;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// File-based audit logger that appends JSON lines
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    /// Create a new audit logger from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Log an audit event as a JSON line
    ///
    /// IO failures are logged and dropped; auditing never fails the
    /// operation being audited.
    pub async fn log(&self, event: &str, data: &serde_json::Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log: {}", e);
        }
    }

    /// Record a provisioning result
    pub async fn provisioned(&self, cloud: &str, job_full_name: &str, result: &Provisioned) {
        let event = match result.outcome {
            ProvisionOutcome::Created => "volume.created",
            ProvisionOutcome::Reused => "volume.reused",
        };

        self.log(
            event,
            &serde_json::json!({
                "cloud": cloud,
                "job": job_full_name,
                "claim": result.claim.name(),
                "namespace": result.claim.namespace(),
            }),
        )
        .await;
    }

    /// Record every cleanup outcome that touched a cluster
    pub async fn cleanup(&self, report: &CleanupReport) {
        for outcome in &report.outcomes {
            let event = match outcome.status {
                CleanupStatus::NotFound => continue,
                CleanupStatus::Deleted => "volume.deleted",
                CleanupStatus::DeleteRejected => "volume.delete_failed",
                CleanupStatus::Unreachable(_) => "cloud.unreachable",
            };

            self.log(event, &serde_json::to_value(outcome).unwrap_or_default())
                .await;
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
