//! Local cache session

use crate::coordinate::Coordinate;
use crate::error::{QuarryError, QuarryResult};
use crate::transport::layout;
use std::path::{Path, PathBuf};

/// Handle on the local artifact cache
///
/// The cache directory must already exist when the session opens;
/// callers decide whether and where to create one.
#[derive(Debug, Clone)]
pub struct CacheSession {
    root: PathBuf,
}

impl CacheSession {
    /// Open a session over an existing cache directory
    pub fn open(root: impl Into<PathBuf>) -> QuarryResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(QuarryError::LocalRepoMissing(root));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the artifact lives (or will live) inside the cache
    pub fn artifact_path(&self, coordinate: &Coordinate) -> PathBuf {
        self.root.join(layout::artifact_rel_path(coordinate))
    }

    /// Whether the artifact is already cached
    pub async fn contains(&self, coordinate: &Coordinate) -> bool {
        tokio::fs::try_exists(self.artifact_path(coordinate))
            .await
            .unwrap_or(false)
    }
}
