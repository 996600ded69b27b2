//! Versions command - list advertised versions for an artifact

use crate::cli::args::{OutputFormat, VersionsArgs};
use crate::cli::commands::{build_resolver, Overrides};
use crate::config::Config;
use crate::error::{QuarryError, QuarryResult};
use crate::ui::{self, UiContext};
use crate::version::Version;

/// Execute the versions command
pub async fn execute(
    args: VersionsArgs,
    config: &Config,
    overrides: &Overrides,
) -> QuarryResult<()> {
    let (group, artifact) = split_artifact(&args.artifact)?;
    let ctx = UiContext::detect();
    let spinner = ui::TaskSpinner::start(&ctx, &format!("querying versions of {}", args.artifact));
    let listed = match build_resolver(config, overrides).await {
        Ok(resolver) => resolver.available_versions(group, artifact).await,
        Err(err) => Err(err),
    };
    spinner.finish();
    let versions = listed?;

    if versions.is_empty() {
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::json!({ "versions": [] })),
            OutputFormat::Plain => {}
            OutputFormat::Table => {
                ui::step_warn_hint(
                    &ctx,
                    &format!("no versions advertised for {}", args.artifact),
                    "Check the repositories with 'quarry repos'",
                );
            }
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&args.artifact, &versions),
        OutputFormat::Json => print_json(&versions)?,
        OutputFormat::Plain => print_plain(&versions),
    }

    Ok(())
}

fn split_artifact(input: &str) -> QuarryResult<(&str, &str)> {
    match input.split(':').collect::<Vec<_>>().as_slice() {
        [group, artifact] if !group.is_empty() && !artifact.is_empty() => Ok((*group, *artifact)),
        // Version listings are not narrowed by extension; accept and drop it
        [group, artifact, extension]
            if !group.is_empty() && !artifact.is_empty() && !extension.is_empty() =>
        {
            Ok((*group, *artifact))
        }
        _ => Err(QuarryError::coordinate(
            input,
            "expected group:artifact[:extension]",
        )),
    }
}

fn print_table(artifact: &str, versions: &[Version]) {
    let ctx = UiContext::detect();
    ui::section(&ctx, &format!("versions of {}", artifact));
    for version in versions {
        println!("  {}", version);
    }
    if let Some(latest) = versions.last() {
        ui::remark(&ctx, &format!("latest: {}", latest));
    }
}

fn print_json(versions: &[Version]) -> QuarryResult<()> {
    let raw: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
    let json = serde_json::to_string_pretty(&serde_json::json!({ "versions": raw }))?;
    println!("{}", json);
    Ok(())
}

fn print_plain(versions: &[Version]) {
    for version in versions {
        println!("{}", version);
    }
}
