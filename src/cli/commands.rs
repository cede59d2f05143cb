//! CLI command definitions using clap
//!
//! Defines all CLI subcommands and their arguments.

use clap::{Parser, Subcommand, ValueEnum};

/// Container test-harness utilities for the cluster starter suite.
///
/// Lists, cleans and inspects the containers the integration tests leave
/// behind, and waits for containers to come up.
#[derive(Parser, Debug)]
#[command(name = "starterbed")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (overrides default XDG paths)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove all containers carrying the cleanup label
    Cleanup(CleanupArgs),

    /// List containers, optionally filtered by label
    Ps(PsArgs),

    /// Dump the logs of a container
    Logs(LogsArgs),

    /// Poll until a container reports running
    Wait(WaitArgs),

    /// Manage scratch volumes
    Volume(VolumeArgs),
}

/// Arguments for the `cleanup` subcommand
#[derive(Parser, Debug)]
pub struct CleanupArgs {
    /// Label to match, as key=value (defaults to the configured cleanup label)
    #[arg(short, long)]
    pub label: Option<String>,
}

/// Arguments for the `ps` subcommand
#[derive(Parser, Debug)]
pub struct PsArgs {
    /// Restrict to containers carrying this key=value label
    #[arg(short, long)]
    pub label: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Output format options
#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON output
    Json,
    /// Plain text (one container id per line)
    Plain,
}

/// Arguments for the `logs` subcommand
#[derive(Parser, Debug)]
pub struct LogsArgs {
    /// Container id or name
    #[arg(required = true)]
    pub container: String,

    /// Prefix each line with its timestamp
    #[arg(short, long)]
    pub timestamps: bool,
}

/// Arguments for the `wait` subcommand
#[derive(Parser, Debug)]
pub struct WaitArgs {
    /// Container id or name
    #[arg(required = true)]
    pub container: String,

    /// Deadline in seconds (defaults to the configured wait timeout)
    #[arg(short, long)]
    pub timeout_secs: Option<u64>,

    /// Probe spacing in milliseconds (defaults to the configured interval)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_ms: Option<u64>,
}

/// Arguments for the `volume` subcommand
#[derive(Parser, Debug)]
pub struct VolumeArgs {
    #[command(subcommand)]
    pub action: VolumeAction,
}

/// Volume operations
#[derive(Subcommand, Debug)]
pub enum VolumeAction {
    /// Create a volume
    Create {
        /// Volume name
        name: String,
    },
    /// Force-remove a volume
    Rm {
        /// Volume name
        name: String,
    },
}
