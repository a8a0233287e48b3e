//! Event command - clean up claims after a job lifecycle event

use crate::audit::AuditLog;
use crate::cli::args::{EventArgs, OutputFormat};
use crate::cluster::KubectlClientFactory;
use crate::config::Config;
use crate::error::{JobPvcError, JobPvcResult};
use crate::reconcile::{CleanupReport, CleanupStatus, ItemEvent, Reconciler};
use crate::ui::{self, UiContext};
use console::style;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Execute the event command
///
/// Cloud failures are reported but do not fail the command; only a
/// malformed event does.
pub async fn execute(args: EventArgs, config: &Config) -> JobPvcResult<()> {
    let raw = read_event(args.file.as_deref()).await?;
    let event = parse_event(&raw)?;

    let reconciler = Reconciler::new(&config.clouds, &KubectlClientFactory);
    let report = reconciler.handle(&event).await?;

    AuditLog::new(config).cleanup(&report).await;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Plain => print_plain(&report),
        OutputFormat::Table => print_table(&event, &report),
    }

    Ok(())
}

async fn read_event(file: Option<&Path>) -> JobPvcResult<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| JobPvcError::io(format!("reading event from {}", path.display()), e)),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .map_err(|e| JobPvcError::io("reading event from stdin", e))?;
            Ok(raw)
        }
    }
}

/// Parse an event document
pub fn parse_event(raw: &str) -> JobPvcResult<ItemEvent> {
    serde_json::from_str(raw).map_err(|e| JobPvcError::InvalidEvent(e.to_string()))
}

fn print_plain(report: &CleanupReport) {
    for outcome in &report.outcomes {
        println!(
            "{}\t{}\t{}",
            outcome.cloud, outcome.claim_name, outcome.status
        );
    }
}

fn print_table(event: &ItemEvent, report: &CleanupReport) {
    let ctx = UiContext::detect();
    ui::intro(
        &ctx,
        &format!("{} {}", event.kind(), event.item().full_name()),
    );

    if report.outcomes.is_empty() {
        ui::step_info(&ctx, "No job claims affected");
        return;
    }

    println!(
        "{:<20} {:<40} {:<20} {:<16}",
        style("CLOUD").bold(),
        style("CLAIM").bold(),
        style("NAMESPACE").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(96));

    for outcome in &report.outcomes {
        let status = match &outcome.status {
            CleanupStatus::Deleted => style("deleted".to_string()).green(),
            CleanupStatus::NotFound => style("not found".to_string()).dim(),
            CleanupStatus::DeleteRejected => style("rejected".to_string()).yellow(),
            CleanupStatus::Unreachable(_) => style("unreachable".to_string()).red(),
        };
        println!(
            "{:<20} {:<40} {:<20} {:<16}",
            outcome.cloud, outcome.claim_name, outcome.namespace, status
        );
    }

    let failures = report.failures();
    if failures.is_empty() {
        ui::outro_success(
            &ctx,
            &format!("{} claim(s) removed", report.deleted_count()),
        );
    } else {
        for failure in &failures {
            if let CleanupStatus::Unreachable(reason) = &failure.status {
                ui::step_error_detail(&ctx, &failure.cloud, reason);
            }
        }
        ui::outro_warn(
            &ctx,
            &format!(
                "{} claim(s) removed, {} may be left over",
                report.deleted_count(),
                failures.len()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_delete_event() {
        let event = parse_event(r#"{"event":"deleted","item":{"kind":"job","full_name":"proj/app"}}"#)
            .unwrap();
        assert_eq!(event.item().full_name(), "proj/app");
    }

    #[test]
    fn rejects_malformed_event() {
        let err = parse_event(r#"{"event":"exploded"}"#).unwrap_err();
        assert!(matches!(err, JobPvcError::InvalidEvent(_)));
    }
}
