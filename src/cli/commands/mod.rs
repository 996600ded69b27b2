//! CLI command implementations

pub mod config;
pub mod fetch;
pub mod repos;
pub mod versions;

pub use config::execute as config;
pub use fetch::execute as fetch;
pub use repos::execute as repos;
pub use versions::execute as versions;

use crate::config::{Config, ConfigManager};
use crate::error::{QuarryError, QuarryResult};
use crate::resolver::{HttpProbe, Resolver};
use crate::transport::HttpTransport;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;

/// Repository and cache settings chosen from flags and configuration
#[derive(Debug, Clone)]
pub struct Overrides {
    /// Cache directory from the command line, if given
    pub cache_dir: Option<PathBuf>,
    /// Repositories from the command line, if given
    pub repos: Vec<String>,
}

/// Repository URLs to use, command line winning over configuration
pub fn effective_repositories(config: &Config, overrides: &Overrides) -> Vec<String> {
    if overrides.repos.is_empty() {
        config.repositories.urls.clone()
    } else {
        overrides.repos.clone()
    }
}

/// Cache directory to use. The built-in default is created on first
/// use; explicitly chosen directories must already exist.
pub async fn effective_cache_dir(
    config: &Config,
    overrides: &Overrides,
) -> QuarryResult<PathBuf> {
    if let Some(dir) = &overrides.cache_dir {
        return Ok(dir.clone());
    }
    if let Some(dir) = &config.cache.dir {
        return Ok(dir.clone());
    }
    let dir = ConfigManager::default_cache_dir();
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| QuarryError::io(format!("creating cache directory {}", dir.display()), e))?;
    Ok(dir)
}

/// Build a resolver from configuration and command-line overrides
pub async fn build_resolver(config: &Config, overrides: &Overrides) -> QuarryResult<Resolver> {
    let cache_dir = effective_cache_dir(config, overrides).await?;
    let urls = effective_repositories(config, overrides);
    let timeout = Duration::from_secs(config.network.timeout_secs);
    Resolver::with_transport(
        cache_dir,
        &urls,
        Arc::new(HttpTransport::new(timeout)),
        &HttpProbe::new(timeout),
    )
    .await
}
