//! Repository transport
//!
//! The [`Transport`] trait is the seam between resolution logic and
//! the wire. The default implementation speaks HTTP(S) and `file://`;
//! tests substitute their own.

use crate::coordinate::Coordinate;
use crate::resolver::registry::RepositoryDescriptor;
use crate::resolver::session::CacheSession;
use crate::version::{RangeParseError, Version};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub mod http;
pub mod layout;

pub use http::HttpTransport;

/// Errors from repository access
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("artifact not found in any repository: {coordinate}")]
    NotFound { coordinate: String },

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Range(#[from] RangeParseError),

    #[error("background task failed: {0}")]
    Task(String),
}

impl TransportError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Fetches artifacts and version listings from remote repositories
#[async_trait]
pub trait Transport: Send + Sync {
    /// Download the artifact into the cache, trying repositories in
    /// order. Returns the cached path on the first hit.
    async fn fetch(
        &self,
        coordinate: &Coordinate,
        repositories: &[RepositoryDescriptor],
        cache: &CacheSession,
    ) -> Result<PathBuf, TransportError>;

    /// All versions the repositories advertise for the coordinate's
    /// group and artifact, unioned with the locally cached manifest.
    /// Repositories without a manifest contribute nothing; the result
    /// may be empty.
    async fn list_versions(
        &self,
        coordinate: &Coordinate,
        repositories: &[RepositoryDescriptor],
        cache: &CacheSession,
    ) -> Result<Vec<Version>, TransportError>;
}
