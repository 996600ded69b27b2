//! Repos command - show repositories and their reachability

use crate::cli::args::{OutputFormat, ReposArgs};
use crate::cli::commands::{build_resolver, Overrides};
use crate::config::Config;
use crate::error::QuarryResult;
use crate::resolver::RepositoryDescriptor;
use crate::ui::{self, UiContext};

/// Execute the repos command
pub async fn execute(args: ReposArgs, config: &Config, overrides: &Overrides) -> QuarryResult<()> {
    let ctx = UiContext::detect();
    let spinner = ui::TaskSpinner::start(&ctx, "probing repositories");
    let built = build_resolver(config, overrides).await;
    spinner.finish();
    let resolver = built?;
    let repositories = resolver.registry().repositories();

    if repositories.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                ui::step_warn_hint(
                    &ctx,
                    "no repositories configured",
                    "Add one with 'quarry config set repositories.urls URL'",
                );
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(repositories),
        OutputFormat::Json => print_json(repositories)?,
        OutputFormat::Plain => print_plain(repositories),
    }

    Ok(())
}

fn print_table(repositories: &[RepositoryDescriptor]) {
    let ctx = UiContext::detect();
    ui::section(&ctx, "repositories");
    for repo in repositories {
        // Unreachable repositories show where requests actually go
        let value = if repo.reachable {
            repo.url.clone()
        } else {
            format!("{} -> {}", repo.configured_url, repo.url)
        };
        ui::key_value_status(&ctx, &repo.id, &value, repo.reachable);
    }
}

fn print_json(repositories: &[RepositoryDescriptor]) -> QuarryResult<()> {
    let json = serde_json::to_string_pretty(repositories)?;
    println!("{}", json);
    Ok(())
}

fn print_plain(repositories: &[RepositoryDescriptor]) {
    for repo in repositories {
        let status = if repo.reachable { "ok" } else { "unreachable" };
        println!("{} {} {}", repo.id, repo.configured_url, status);
    }
}
