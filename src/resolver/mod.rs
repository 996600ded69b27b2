//! Artifact resolution
//!
//! [`Resolver`] ties the pieces together: repositories are probed
//! once at construction, versions are pinned, the cache is consulted,
//! and only then does the transport go to the network. Resolution
//! failures carry the coordinate as requested, with the underlying
//! transport error as the cause.

use crate::coordinate::Coordinate;
use crate::error::{QuarryError, QuarryResult};
use crate::transport::{HttpTransport, Transport, TransportError};
use crate::version::Version;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};
use tracing::{debug, info};

pub mod probe;
pub mod range;
pub mod registry;
pub mod session;

pub use probe::{HttpProbe, RepositoryProbe};
pub use registry::{RepositoryDescriptor, RepositoryRegistry};
pub use session::CacheSession;

/// Resolves coordinates to cached artifact files
pub struct Resolver {
    cache_root: PathBuf,
    registry: RepositoryRegistry,
    transport: Arc<dyn Transport>,
}

/// A coordinate pinned to a concrete version, with its cache location
#[derive(Debug, Clone)]
pub struct ResolvedArtifact {
    pub coordinate: Coordinate,
    pub path: PathBuf,
}

/// An open read stream over a resolved artifact
#[derive(Debug)]
pub struct ArtifactStream {
    artifact: ResolvedArtifact,
    file: File,
}

impl Resolver {
    /// Build a resolver with the default HTTP transport and probe
    pub async fn new(
        cache_root: impl Into<PathBuf>,
        repository_urls: &[String],
    ) -> QuarryResult<Self> {
        Self::with_transport(
            cache_root,
            repository_urls,
            Arc::new(HttpTransport::default()),
            &HttpProbe::default(),
        )
        .await
    }

    /// Build a resolver around a caller-supplied transport and probe
    pub async fn with_transport(
        cache_root: impl Into<PathBuf>,
        repository_urls: &[String],
        transport: Arc<dyn Transport>,
        probe: &dyn RepositoryProbe,
    ) -> QuarryResult<Self> {
        let cache_root = cache_root.into();
        // Fail fast here; each resolve call opens its own session
        CacheSession::open(&cache_root)?;
        let registry = RepositoryRegistry::build(repository_urls, probe).await;
        Ok(Self {
            cache_root,
            registry,
            transport,
        })
    }

    pub fn registry(&self) -> &RepositoryRegistry {
        &self.registry
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Resolve a coordinate given as parts
    pub async fn resolve(
        &self,
        group: &str,
        artifact: &str,
        extension: &str,
        version: &str,
    ) -> QuarryResult<ArtifactStream> {
        self.resolve_coordinate(Coordinate::new(group, artifact, extension, version)?)
            .await
    }

    /// Resolve a coordinate to an open stream over the cached file.
    ///
    /// The version may be pinned, `LATEST`, or a bracket range; the
    /// returned artifact carries the version actually resolved.
    pub async fn resolve_coordinate(&self, coordinate: Coordinate) -> QuarryResult<ArtifactStream> {
        let cache = CacheSession::open(&self.cache_root)?;
        let requested = coordinate.to_string();
        let (pinned, path) = match self.materialize(&cache, coordinate).await {
            Ok(resolved) => resolved,
            Err(source) => {
                return Err(QuarryError::Resolution {
                    coordinate: requested,
                    source,
                })
            }
        };
        info!("resolved ({pinned}) as {}", path.display());
        let file = File::open(&path)
            .await
            .map_err(|e| QuarryError::io(format!("open {}", path.display()), e))?;
        Ok(ArtifactStream {
            artifact: ResolvedArtifact {
                coordinate: pinned,
                path,
            },
            file,
        })
    }

    /// All versions the repositories advertise, in ascending order
    pub async fn available_versions(
        &self,
        group: &str,
        artifact: &str,
    ) -> QuarryResult<Vec<Version>> {
        let cache = CacheSession::open(&self.cache_root)?;
        let coordinate = Coordinate::new(
            group,
            artifact,
            crate::coordinate::DEFAULT_EXTENSION,
            range::LATEST,
        )?;
        let requested = coordinate.to_string();
        let mut versions = self
            .transport
            .list_versions(&coordinate, self.registry.repositories(), &cache)
            .await
            .map_err(|source| QuarryError::Resolution {
                coordinate: requested,
                source,
            })?;
        versions.sort();
        Ok(versions)
    }

    async fn materialize(
        &self,
        cache: &CacheSession,
        coordinate: Coordinate,
    ) -> Result<(Coordinate, PathBuf), TransportError> {
        let repositories = self.registry.repositories();
        let pinned =
            range::pin_version(&coordinate, repositories, cache, self.transport.as_ref()).await?;
        if cache.contains(&pinned).await {
            debug!("cache hit for {pinned}");
            let path = cache.artifact_path(&pinned);
            return Ok((pinned, path));
        }
        let path = self.transport.fetch(&pinned, repositories, cache).await?;
        Ok((pinned, path))
    }
}

impl ArtifactStream {
    pub fn artifact(&self) -> &ResolvedArtifact {
        &self.artifact
    }

    pub fn path(&self) -> &Path {
        &self.artifact.path
    }
}

impl AsyncRead for ArtifactStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_read(cx, buf)
    }
}
