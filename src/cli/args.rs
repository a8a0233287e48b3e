//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// jobpvc - per-job persistent volume claims for build agents
///
/// Provisions one reusable claim per job and removes it when the job is
/// deleted, renamed or moved.
#[derive(Parser, Debug)]
#[command(name = "jobpvc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "JOBPVC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, global = true, env = "JOBPVC_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the volume name derived from a job full name
    Name(NameArgs),

    /// Create or reuse the claim for a job build
    Provision(ProvisionArgs),

    /// Clean up claims for a job lifecycle event (JSON)
    Event(EventArgs),

    /// List job claims on every cloud
    List(ListArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the name command
#[derive(Parser, Debug)]
pub struct NameArgs {
    /// Job full name (e.g. "team/build-a")
    pub job: String,
}

/// Arguments for the provision command
#[derive(Parser, Debug)]
pub struct ProvisionArgs {
    /// Full name of the job being built
    #[arg(short, long)]
    pub job: String,

    /// Build number of the run
    #[arg(short, long, default_value = "1")]
    pub build: u64,

    /// Cloud to provision on (defaults to the first configured cloud)
    #[arg(long)]
    pub cloud: Option<String>,

    /// Namespace of the pod (defaults to the cloud's namespace)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Pod the volume is for
    #[arg(long, default_value = "build-agent")]
    pub pod: String,

    /// Name of the volume inside the pod spec
    #[arg(long, default_value = "workspace-volume")]
    pub volume_name: String,

    /// Storage class (empty for the cluster default)
    #[arg(long)]
    pub storage_class: Option<String>,

    /// Requested size, may reference ${VARS}
    #[arg(long)]
    pub size: Option<String>,

    /// Access mode: ReadWriteOnce, ReadOnlyMany or ReadWriteMany
    #[arg(long)]
    pub access_mode: Option<String>,

    /// Extra environment variables for size substitution (KEY=VALUE)
    #[arg(short, long, value_parser = parse_env_var)]
    pub env: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the event command
#[derive(Parser, Debug)]
pub struct EventArgs {
    /// File holding the event (reads stdin when omitted)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list this cloud
    #[arg(long)]
    pub cloud: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for reporting commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text lines
    Text,
    /// One JSON object per line
    Json,
}

/// Parse environment variable in KEY=VALUE format
fn parse_env_var(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE format: no '=' found in '{s}'"))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}
