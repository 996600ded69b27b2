//! Repository reachability probing
//!
//! A probe answers one question: can this repository URL serve
//! requests right now? It never errors; an unreachable repository is
//! an answer, not a failure.

use crate::transport::http::build_agent;
use crate::transport::layout;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use ureq::Agent;

/// Decides whether a repository URL is currently reachable
#[async_trait]
pub trait RepositoryProbe: Send + Sync {
    async fn probe(&self, url: &str) -> bool;
}

/// Probe that issues a GET against HTTP(S) URLs and a filesystem
/// check against `file://` ones
pub struct HttpProbe {
    agent: Agent,
}

impl HttpProbe {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
        }
    }
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new(crate::transport::http::DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl RepositoryProbe for HttpProbe {
    async fn probe(&self, url: &str) -> bool {
        debug!("probing {url}");
        if let Some(path) = layout::file_url_to_path(url) {
            return tokio::fs::metadata(path).await.is_ok();
        }
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || agent.get(&url).call().is_ok())
            .await
            .unwrap_or(false)
    }
}
