//! Repository registry
//!
//! Turns configured URLs into descriptors the transport can use.
//! Every URL is probed once, in parallel, when the registry is built.
//! Unreachable repositories keep their slot but have their URL
//! replaced with a placeholder that can never serve an artifact, so
//! resolution order and repository ids stay stable no matter which
//! repositories happen to be down.

use crate::resolver::probe::RepositoryProbe;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::warn;

/// URL substituted for unreachable repositories
pub const PLACEHOLDER_URL: &str = "file:///dummy";

/// Repository content kind; all repositories are plain layout
pub const REPOSITORY_KIND: &str = "default";

/// A repository as seen by resolution
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryDescriptor {
    /// Stable id derived from position: `repo0`, `repo1`, ...
    pub id: String,
    pub kind: String,
    /// Effective URL; the placeholder when the probe failed
    pub url: String,
    /// URL as configured, kept for display
    pub configured_url: String,
    pub reachable: bool,
}

/// The probed set of repositories, in configuration order
#[derive(Debug, Clone)]
pub struct RepositoryRegistry {
    repositories: Vec<RepositoryDescriptor>,
}

impl RepositoryRegistry {
    /// Probe every URL and build descriptors. Input order is
    /// preserved; ids are assigned by position.
    pub async fn build(urls: &[String], probe: &dyn RepositoryProbe) -> Self {
        let checks = urls.iter().map(|url| probe.probe(url));
        let results = join_all(checks).await;
        let repositories = urls
            .iter()
            .zip(results)
            .enumerate()
            .map(|(i, (url, reachable))| {
                if !reachable {
                    warn!("repository {url} is unreachable, substituting placeholder");
                }
                RepositoryDescriptor {
                    id: format!("repo{i}"),
                    kind: REPOSITORY_KIND.to_string(),
                    url: if reachable {
                        url.clone()
                    } else {
                        PLACEHOLDER_URL.to_string()
                    },
                    configured_url: url.clone(),
                    reachable,
                }
            })
            .collect();
        Self { repositories }
    }

    pub fn repositories(&self) -> &[RepositoryDescriptor] {
        &self.repositories
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }

    /// How many configured repositories answered the probe
    pub fn reachable_count(&self) -> usize {
        self.repositories.iter().filter(|r| r.reachable).count()
    }
}
