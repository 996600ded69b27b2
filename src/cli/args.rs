//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Quarry - Artifact Coordinate Resolver
///
/// Resolves Maven-style coordinates to files in a local cache,
/// fetching from remote repositories as needed.
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "QUARRY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Cache directory, overriding the configured one
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Repository URL; repeat to try several in order. Overrides the
    /// configured repositories.
    #[arg(long = "repo", global = true, value_name = "URL")]
    pub repos: Vec<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a coordinate and fetch the artifact
    Fetch(FetchArgs),

    /// List available versions for an artifact
    Versions(VersionsArgs),

    /// Show repositories and their reachability
    Repos(ReposArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Coordinate to resolve: group:artifact[:extension]:version.
    /// The version may be pinned, LATEST, or a range like [1.0,2.0)
    pub coordinate: String,

    /// Copy the artifact here ('-' for stdout) instead of printing
    /// its cache path
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the versions command
#[derive(Parser, Debug)]
pub struct VersionsArgs {
    /// Artifact to query, as group:artifact[:extension]
    pub artifact: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the repos command
#[derive(Parser, Debug)]
pub struct ReposArgs {
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

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., cache.dir)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
