//! List command - show job claims on every cloud

use crate::cli::args::{ListArgs, OutputFormat};
use crate::cluster::{ClientFactory, KubectlClientFactory};
use crate::config::{CloudConfig, Config};
use crate::error::{JobPvcError, JobPvcResult};
use crate::ui::{self, UiContext};
use console::style;
use serde::Serialize;
use tracing::warn;

/// A job claim found on a cloud
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimEntry {
    pub cloud: String,
    pub namespace: String,
    pub claim: String,
    pub job: String,
    pub size: Option<String>,
}

/// A cloud that could not be listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListFailure {
    pub cloud: String,
    pub reason: String,
}

/// Execute the list command
pub async fn execute(args: ListArgs, config: &Config) -> JobPvcResult<()> {
    let clouds: Vec<&CloudConfig> = match args.cloud.as_deref() {
        Some(name) => vec![config
            .cloud(name)
            .ok_or_else(|| JobPvcError::CloudNotFound(name.to_string()))?],
        None => config.clouds.iter().collect(),
    };

    if clouds.is_empty() {
        return Err(JobPvcError::NoCloudsConfigured);
    }

    let (entries, failures) = collect_claims(&clouds, &KubectlClientFactory).await;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "claims": entries, "failures": failures });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => {
            for entry in &entries {
                println!("{}", entry.claim);
            }
        }
        OutputFormat::Table => print_table(&entries, &failures),
    }

    Ok(())
}

/// List claims that carry a job annotation on each cloud
///
/// Unreachable clouds are collected as failures; the rest are still listed.
pub async fn collect_claims(
    clouds: &[&CloudConfig],
    factory: &dyn ClientFactory,
) -> (Vec<ClaimEntry>, Vec<ListFailure>) {
    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for cloud in clouds {
        let listed = match factory.create_client(cloud) {
            Ok(client) => client.list_claims(client.namespace()).await,
            Err(e) => Err(e),
        };

        match listed {
            Ok(claims) => {
                entries.extend(claims.into_iter().filter_map(|claim| {
                    let job = claim.job_full_name()?.to_string();
                    Some(ClaimEntry {
                        cloud: cloud.name.clone(),
                        namespace: claim.namespace().unwrap_or(&cloud.namespace).to_string(),
                        claim: claim.name().to_string(),
                        job,
                        size: claim.storage_request().map(str::to_string),
                    })
                }));
            }
            Err(e) => {
                warn!("Could not list claims on cloud {}: {}", cloud.name, e);
                failures.push(ListFailure {
                    cloud: cloud.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    (entries, failures)
}

fn print_table(entries: &[ClaimEntry], failures: &[ListFailure]) {
    let ctx = UiContext::detect();
    ui::intro(&ctx, "Job claims");

    for failure in failures {
        ui::step_error_detail(&ctx, &format!("Cloud {} unreachable", failure.cloud), &failure.reason);
    }

    if entries.is_empty() {
        ui::step_info(&ctx, "No job claims");
        return;
    }

    println!(
        "{:<16} {:<16} {:<36} {:<8} {:<30}",
        style("CLOUD").bold(),
        style("NAMESPACE").bold(),
        style("CLAIM").bold(),
        style("SIZE").bold(),
        style("JOB").bold()
    );
    println!("{}", "-".repeat(110));

    for entry in entries {
        println!(
            "{:<16} {:<16} {:<36} {:<8} {:<30}",
            entry.cloud,
            entry.namespace,
            entry.claim,
            entry.size.as_deref().unwrap_or("-"),
            entry.job
        );
    }

    println!();
    println!("{} claim(s)", entries.len());
}
