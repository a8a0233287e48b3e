//! Provision command - create or reuse the claim for a build

use crate::annotation::{collect_for_run, default_providers, RunContext};
use crate::audit::AuditLog;
use crate::cli::args::{OutputFormat, ProvisionArgs};
use crate::cluster::{self, KubectlClientFactory};
use crate::config::Config;
use crate::env::{resolve_quantity, EnvSnapshot};
use crate::error::JobPvcResult;
use crate::ui::{self, UiContext};
use crate::volume::{DynamicJobVolume, PodMetadata, ProvisionOutcome};
use tracing::debug;

/// Execute the provision command
pub async fn execute(args: ProvisionArgs, config: &Config) -> JobPvcResult<()> {
    let run = RunContext::new(&args.job, args.build);
    let annotations = collect_for_run(&default_providers(), &run);

    let mut volume = DynamicJobVolume::from_config(&config.volume);
    if args.storage_class.is_some() {
        volume.set_storage_class_name(args.storage_class);
    }
    if args.size.is_some() {
        volume.set_requests_size(args.size);
    }
    if args.access_mode.is_some() {
        volume.set_access_modes(args.access_mode);
    }
    volume.process_annotations(&annotations)?;

    let pod_volume = volume.build_volume(&args.volume_name, &args.pod)?;

    // Bad settings fail here, before a cloud is picked
    let env = EnvSnapshot::from_process().extend(args.env);
    volume.access_mode_or_default()?;
    resolve_quantity(volume.requests_size_or_default(), &env)?;

    let client = cluster::create_client(config, &KubectlClientFactory, args.cloud.as_deref())?;
    let namespace = args
        .namespace
        .unwrap_or_else(|| client.namespace().to_string());
    let pod = PodMetadata::new(&args.pod, namespace);

    debug!(
        "Provisioning for {} #{} on cloud {}",
        run.job_full_name,
        run.build_number,
        client.cloud_name()
    );

    let result = volume.provision(client.as_ref(), &pod, &env).await?;

    AuditLog::new(config)
        .provisioned(client.cloud_name(), &run.job_full_name, &result)
        .await;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "cloud": client.cloud_name(),
                "outcome": result.outcome.to_string(),
                "claim": result.claim,
                "volume": pod_volume,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Plain => println!("{}", result.claim.name()),
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            let message = match result.outcome {
                ProvisionOutcome::Created => "Created claim",
                ProvisionOutcome::Reused => "Reused claim",
            };
            ui::step_ok_detail(&ctx, message, result.claim.name());
            ui::key_value(&ctx, "Cloud", client.cloud_name());
            ui::key_value(&ctx, "Namespace", &pod.namespace);
            ui::key_value(&ctx, "Size", result.claim.storage_request().unwrap_or("-"));
            ui::key_value(&ctx, "Volume", &pod_volume.name);
        }
    }

    Ok(())
}
