//! Repository layout
//!
//! Remote repositories and the local cache share one directory
//! layout, so a relative path computed here works against either.

use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the per-artifact version manifest
pub const MANIFEST_FILE: &str = "versions.json";

/// Version manifest stored next to an artifact's version directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionManifest {
    pub versions: Vec<String>,
}

/// Relative path of an artifact file within a repository
pub fn artifact_rel_path(coordinate: &Coordinate) -> String {
    format!(
        "{}/{}/{}/{}-{}.{}",
        coordinate.group.replace('.', "/"),
        coordinate.artifact,
        coordinate.version,
        coordinate.artifact,
        coordinate.version,
        coordinate.extension
    )
}

/// Relative path of the version manifest for a group and artifact
pub fn manifest_rel_path(group: &str, artifact: &str) -> String {
    format!("{}/{}/{}", group.replace('.', "/"), artifact, MANIFEST_FILE)
}

/// Join a repository base URL and a relative path
pub fn join_url(base: &str, rel: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), rel)
}

/// The filesystem path behind a `file://` URL, if it is one
pub fn file_url_to_path(url: &str) -> Option<PathBuf> {
    url.strip_prefix("file://").map(PathBuf::from)
}
