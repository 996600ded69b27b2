//! Quarry - Artifact Coordinate Resolver
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use quarry::cli::commands::{self, Overrides};
use quarry::cli::{Cli, Commands};
use quarry::config::ConfigManager;
use quarry::error::QuarryResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {} {}", style("caused by:").dim(), cause);
                source = cause.source();
            }
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> QuarryResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = warn, 1 = info, 2+ = debug.
    // Logs go to stderr; stdout is reserved for command output and
    // streamed artifacts.
    let filter = match cli.verbose {
        0 => EnvFilter::new("quarry=warn"),
        1 => EnvFilter::new("quarry=info"),
        _ => EnvFilter::new("quarry=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    let overrides = Overrides {
        cache_dir: cli.cache_dir,
        repos: cli.repos,
    };

    // Dispatch to command
    match cli.command {
        Commands::Fetch(args) => commands::fetch(args, &config, &overrides).await,
        Commands::Versions(args) => commands::versions(args, &config, &overrides).await,
        Commands::Repos(args) => commands::repos(args, &config, &overrides).await,
        Commands::Config(args) => commands::config(args, &config_manager, &config).await,
    }
}
