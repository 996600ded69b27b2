//! Fetch command - resolve a coordinate and materialize the artifact

use crate::cli::args::FetchArgs;
use crate::cli::commands::{build_resolver, Overrides};
use crate::config::Config;
use crate::coordinate::Coordinate;
use crate::error::{QuarryError, QuarryResult};
use crate::ui::{self, UiContext};
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config, overrides: &Overrides) -> QuarryResult<()> {
    let coordinate = Coordinate::parse(&args.coordinate)?;
    let ctx = UiContext::detect();

    let spinner = ui::TaskSpinner::start(&ctx, &format!("resolving {coordinate}"));
    let outcome = match build_resolver(config, overrides).await {
        Ok(resolver) => resolver.resolve_coordinate(coordinate).await,
        Err(err) => Err(err),
    };
    spinner.finish();
    let mut stream = outcome?;

    match args.output.as_deref() {
        // Default: the artifact is in the cache, print where
        None => println!("{}", stream.path().display()),
        Some(path) if path == Path::new("-") => {
            let mut stdout = tokio::io::stdout();
            tokio::io::copy(&mut stream, &mut stdout)
                .await
                .map_err(|e| QuarryError::io("writing artifact to stdout", e))?;
            stdout
                .flush()
                .await
                .map_err(|e| QuarryError::io("flushing stdout", e))?;
        }
        Some(path) => {
            let mut file = tokio::fs::File::create(path)
                .await
                .map_err(|e| QuarryError::io(format!("creating {}", path.display()), e))?;
            tokio::io::copy(&mut stream, &mut file)
                .await
                .map_err(|e| QuarryError::io(format!("writing {}", path.display()), e))?;
            ui::step_ok_detail(
                &ctx,
                &format!("fetched {}", stream.artifact().coordinate),
                &path.display().to_string(),
            );
        }
    }

    Ok(())
}
