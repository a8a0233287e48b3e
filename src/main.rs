//! jobpvc - per-job persistent volume claims
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use jobpvc::cli::{Cli, Commands, LogFormat};
use jobpvc::config::ConfigManager;
use jobpvc::error::JobPvcResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            // Caller errors exit with 2
            if e.is_caller_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

async fn run() -> JobPvcResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("jobpvc=warn"),
        1 => EnvFilter::new("jobpvc=info"),
        _ => EnvFilter::new("jobpvc=debug"),
    };

    // Logs go to stderr so stdout stays parseable
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Text => builder.without_time().init(),
        LogFormat::Json => builder.json().init(),
    }

    // Name command doesn't need config loading
    if let Commands::Name(args) = cli.command {
        return jobpvc::cli::commands::name(args);
    }

    let manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    };
    let config = manager.load().await?;

    match cli.command {
        Commands::Name(_) => unreachable!("Name handled above"),
        Commands::Provision(args) => jobpvc::cli::commands::provision(args, &config).await,
        Commands::Event(args) => jobpvc::cli::commands::event(args, &config).await,
        Commands::List(args) => jobpvc::cli::commands::list(args, &config).await,
        Commands::Config(args) => jobpvc::cli::commands::config(args, &manager, &config).await,
    }
}
