//! HTTP and file-based transport
//!
//! Speaks plain GET against HTTP(S) repositories and direct reads
//! against `file://` ones. Network calls run on the blocking pool.
//! Downloads land in a staging file next to the destination and are
//! renamed into place, so concurrent fetches of the same artifact
//! never observe a partial file.

use crate::coordinate::Coordinate;
use crate::resolver::registry::RepositoryDescriptor;
use crate::resolver::session::CacheSession;
use crate::transport::layout::{self, VersionManifest};
use crate::transport::{Transport, TransportError};
use crate::version::Version;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};
use ureq::Agent;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Transport over HTTP(S) and `file://` repositories
pub struct HttpTransport {
    agent: Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: build_agent(timeout),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

/// Agent settings shared by the transport and the reachability probe
pub(crate) fn build_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .user_agent(concat!("quarry/", env!("CARGO_PKG_VERSION")))
        .build()
        .into()
}

fn staging_path(dest: &Path) -> PathBuf {
    let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.{seq}.part", std::process::id()));
    dest.with_file_name(name)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(
        &self,
        coordinate: &Coordinate,
        repositories: &[RepositoryDescriptor],
        cache: &CacheSession,
    ) -> Result<PathBuf, TransportError> {
        let rel = layout::artifact_rel_path(coordinate);
        let dest = cache.artifact_path(coordinate);
        let mut failure = None;
        for repo in repositories {
            let outcome = if let Some(root) = layout::file_url_to_path(&repo.url) {
                copy_from_file_repo(&root.join(&rel), &dest).await
            } else {
                let url = layout::join_url(&repo.url, &rel);
                download(self.agent.clone(), url, dest.clone()).await
            };
            match outcome {
                Ok(true) => {
                    debug!("fetched {coordinate} from {} ({})", repo.id, repo.url);
                    return Ok(dest);
                }
                Ok(false) => debug!("{} has no {coordinate}", repo.id),
                Err(err) => {
                    warn!("{} failed for {coordinate}: {err}", repo.id);
                    failure = Some(err);
                }
            }
        }
        Err(failure.unwrap_or_else(|| TransportError::NotFound {
            coordinate: coordinate.to_string(),
        }))
    }

    async fn list_versions(
        &self,
        coordinate: &Coordinate,
        repositories: &[RepositoryDescriptor],
        cache: &CacheSession,
    ) -> Result<Vec<Version>, TransportError> {
        let rel = layout::manifest_rel_path(&coordinate.group, &coordinate.artifact);
        let cached_path = cache.root().join(&rel);
        let mut seen = BTreeSet::new();
        let mut versions = Vec::new();

        // The cached manifest participates like a repository, so
        // versions seen before remain resolvable while offline
        match read_file_manifest(&cached_path).await {
            Ok(Some(manifest)) => {
                for version in manifest.versions {
                    if seen.insert(version.clone()) {
                        versions.push(Version::new(version));
                    }
                }
            }
            Ok(None) => {}
            Err(err) => warn!("cached version manifest unreadable: {err}"),
        }
        let known = seen.len();

        for repo in repositories {
            let manifest = if let Some(root) = layout::file_url_to_path(&repo.url) {
                read_file_manifest(&root.join(&rel)).await
            } else {
                let url = layout::join_url(&repo.url, &rel);
                read_http_manifest(self.agent.clone(), url).await
            };
            match manifest {
                Ok(Some(manifest)) => {
                    for version in manifest.versions {
                        if seen.insert(version.clone()) {
                            versions.push(Version::new(version));
                        }
                    }
                }
                Ok(None) => debug!(
                    "{} has no version manifest for {}:{}",
                    repo.id, coordinate.group, coordinate.artifact
                ),
                Err(err) => warn!("{} version listing failed: {err}", repo.id),
            }
        }

        // Repositories taught us something new; remember it
        if seen.len() > known {
            if let Err(err) = write_manifest(&cached_path, &seen).await {
                warn!("failed to cache version manifest: {err}");
            }
        }
        Ok(versions)
    }
}

async fn copy_from_file_repo(src: &Path, dest: &Path) -> Result<bool, TransportError> {
    match tokio::fs::metadata(src).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(TransportError::io(format!("stat {}", src.display()), e)),
        Ok(meta) if !meta.is_file() => return Ok(false),
        Ok(_) => {}
    }
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TransportError::io(format!("create {}", parent.display()), e))?;
    }
    let staging = staging_path(dest);
    let written = match tokio::fs::copy(src, &staging).await {
        Ok(_) => tokio::fs::rename(&staging, dest)
            .await
            .map_err(|e| TransportError::io(format!("rename {}", staging.display()), e)),
        Err(e) => Err(TransportError::io(format!("copy {}", src.display()), e)),
    };
    if let Err(err) = written {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(err);
    }
    Ok(true)
}

async fn download(agent: Agent, url: String, dest: PathBuf) -> Result<bool, TransportError> {
    tokio::task::spawn_blocking(move || {
        let mut response = match agent.get(&url).call() {
            Ok(response) => response,
            Err(ureq::Error::StatusCode(404)) => return Ok(false),
            Err(err) => {
                return Err(TransportError::io(
                    format!("GET {url}"),
                    std::io::Error::other(err),
                ))
            }
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TransportError::io(format!("create {}", parent.display()), e))?;
        }
        let staging = staging_path(&dest);
        let written = write_body(response.body_mut(), &staging).and_then(|()| {
            std::fs::rename(&staging, &dest)
                .map_err(|e| TransportError::io(format!("rename {}", staging.display()), e))
        });
        if written.is_err() {
            let _ = std::fs::remove_file(&staging);
        }
        written.map(|()| true)
    })
    .await
    .map_err(|e| TransportError::Task(e.to_string()))?
}

fn write_body(body: &mut ureq::Body, staging: &Path) -> Result<(), TransportError> {
    let mut file = std::fs::File::create(staging)
        .map_err(|e| TransportError::io(format!("create {}", staging.display()), e))?;
    std::io::copy(&mut body.as_reader(), &mut file)
        .map_err(|e| TransportError::io("read response body", e))?;
    Ok(())
}

async fn read_file_manifest(path: &Path) -> Result<Option<VersionManifest>, TransportError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TransportError::io(format!("read {}", path.display()), e)),
    };
    parse_manifest(&text)
}

async fn read_http_manifest(agent: Agent, url: String) -> Result<Option<VersionManifest>, TransportError> {
    tokio::task::spawn_blocking(move || match agent.get(&url).call() {
        Ok(mut response) => {
            let text = response
                .body_mut()
                .read_to_string()
                .map_err(|e| TransportError::io(format!("read {url}"), std::io::Error::other(e)))?;
            parse_manifest(&text)
        }
        Err(ureq::Error::StatusCode(404)) => Ok(None),
        Err(err) => Err(TransportError::io(
            format!("GET {url}"),
            std::io::Error::other(err),
        )),
    })
    .await
    .map_err(|e| TransportError::Task(e.to_string()))?
}

fn parse_manifest(text: &str) -> Result<Option<VersionManifest>, TransportError> {
    let mut manifest: VersionManifest = serde_json::from_str(text)
        .map_err(|e| TransportError::io("parse version manifest", std::io::Error::other(e)))?;
    // Advertised versions end up as path segments; drop any that cannot be
    manifest
        .versions
        .retain(|v| !v.is_empty() && !v.contains(['/', '\\']) && !matches!(v.as_str(), "." | ".."));
    Ok(Some(manifest))
}

async fn write_manifest(dest: &Path, versions: &BTreeSet<String>) -> Result<(), TransportError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| TransportError::io(format!("create {}", parent.display()), e))?;
    }
    let manifest = VersionManifest {
        versions: versions.iter().cloned().collect(),
    };
    let body = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| TransportError::io("encode version manifest", std::io::Error::other(e)))?;
    let staging = staging_path(dest);
    let written = match tokio::fs::write(&staging, &body).await {
        Ok(()) => tokio::fs::rename(&staging, dest)
            .await
            .map_err(|e| TransportError::io(format!("rename {}", staging.display()), e)),
        Err(e) => Err(TransportError::io(format!("write {}", staging.display()), e)),
    };
    if let Err(err) = written {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::registry::{RepositoryDescriptor, REPOSITORY_KIND};
    use httpmock::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn repo(url: &str) -> RepositoryDescriptor {
        RepositoryDescriptor {
            id: "repo0".to_string(),
            kind: REPOSITORY_KIND.to_string(),
            url: url.to_string(),
            configured_url: url.to_string(),
            reachable: true,
        }
    }

    fn file_url(path: &Path) -> String {
        format!("file://{}", path.display())
    }

    fn seed_artifact(root: &Path, coordinate: &Coordinate, bytes: &[u8]) {
        let path = root.join(layout::artifact_rel_path(coordinate));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[tokio::test]
    async fn file_repo_fetch_lands_in_cache() {
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "1.0").unwrap();
        seed_artifact(remote.path(), &coordinate, b"payload");
        let cache = CacheSession::open(cache_dir.path()).unwrap();

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(remote.path()))];
        let path = transport.fetch(&coordinate, &repos, &cache).await.unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"payload");
        assert!(path.starts_with(cache_dir.path()));
    }

    #[tokio::test]
    async fn second_repo_serves_after_miss() {
        let empty = TempDir::new().unwrap();
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "1.0").unwrap();
        seed_artifact(remote.path(), &coordinate, b"from-second");
        let cache = CacheSession::open(cache_dir.path()).unwrap();

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(empty.path())), repo(&file_url(remote.path()))];
        let path = transport.fetch(&coordinate, &repos, &cache).await.unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"from-second");
    }

    #[tokio::test]
    async fn placeholder_repo_always_misses() {
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "1.0").unwrap();

        let transport = HttpTransport::default();
        let repos = [repo("file:///dummy")];
        let err = transport.fetch(&coordinate, &repos, &cache).await.unwrap_err();

        assert!(matches!(err, TransportError::NotFound { .. }));
    }

    #[tokio::test]
    async fn http_fetch_streams_to_cache() {
        let server = MockServer::start();
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "1.0").unwrap();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/org/demo/app/1.0/app-1.0.jar");
            then.status(200).body("remote-bytes");
        });

        let transport = HttpTransport::default();
        let repos = [repo(&server.base_url())];
        let path = transport.fetch(&coordinate, &repos, &cache).await.unwrap();

        mock.assert();
        assert_eq!(fs::read(&path).unwrap(), b"remote-bytes");
    }

    #[tokio::test]
    async fn http_miss_falls_through_to_next_repo() {
        // Unmatched requests get a 404 from the mock server
        let server = MockServer::start();
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "1.0").unwrap();
        seed_artifact(remote.path(), &coordinate, b"fallback");
        let cache = CacheSession::open(cache_dir.path()).unwrap();

        let transport = HttpTransport::default();
        let repos = [repo(&server.base_url()), repo(&file_url(remote.path()))];
        let path = transport.fetch(&coordinate, &repos, &cache).await.unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"fallback");
    }

    #[tokio::test]
    async fn server_error_surfaces_when_nothing_else_hits() {
        let server = MockServer::start();
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "1.0").unwrap();
        server.mock(|when, then| {
            when.method(GET).path("/org/demo/app/1.0/app-1.0.jar");
            then.status(500);
        });

        let transport = HttpTransport::default();
        let repos = [repo(&server.base_url())];
        let err = transport.fetch(&coordinate, &repos, &cache).await.unwrap_err();

        assert!(matches!(err, TransportError::Io { .. }), "{err}");
    }

    #[tokio::test]
    async fn list_versions_unions_across_repos() {
        let server = MockServer::start();
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "LATEST").unwrap();
        let manifest_dir = remote.path().join("org/demo/app");
        fs::create_dir_all(&manifest_dir).unwrap();
        fs::write(
            manifest_dir.join(layout::MANIFEST_FILE),
            r#"{"versions":["1.0","1.1"]}"#,
        )
        .unwrap();
        server.mock(|when, then| {
            when.method(GET).path("/org/demo/app/versions.json");
            then.status(200).body(r#"{"versions":["1.1","2.0"]}"#);
        });

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(remote.path())), repo(&server.base_url())];
        let versions = transport
            .list_versions(&coordinate, &repos, &cache)
            .await
            .unwrap();

        let raw: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(raw, ["1.0", "1.1", "2.0"]);
    }

    #[tokio::test]
    async fn remote_manifests_are_cached_for_offline_use() {
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "LATEST").unwrap();
        let manifest_dir = remote.path().join("org/demo/app");
        fs::create_dir_all(&manifest_dir).unwrap();
        fs::write(
            manifest_dir.join(layout::MANIFEST_FILE),
            r#"{"versions":["1.0","1.1"]}"#,
        )
        .unwrap();

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(remote.path()))];
        transport
            .list_versions(&coordinate, &repos, &cache)
            .await
            .unwrap();

        // No repositories at all now; the cached manifest answers
        let versions = transport
            .list_versions(&coordinate, &[], &cache)
            .await
            .unwrap();
        let raw: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(raw, ["1.0", "1.1"]);
    }

    #[tokio::test]
    async fn malformed_manifest_is_skipped() {
        let broken = TempDir::new().unwrap();
        let good = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "LATEST").unwrap();
        for (root, body) in [
            (broken.path(), "not json"),
            (good.path(), r#"{"versions":["3.0"]}"#),
        ] {
            let dir = root.join("org/demo/app");
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join(layout::MANIFEST_FILE), body).unwrap();
        }

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(broken.path())), repo(&file_url(good.path()))];
        let versions = transport
            .list_versions(&coordinate, &repos, &cache)
            .await
            .unwrap();

        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].as_str(), "3.0");
    }

    #[tokio::test]
    async fn missing_manifests_yield_empty_list() {
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "ghost", "jar", "LATEST").unwrap();

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(remote.path()))];
        let versions = transport
            .list_versions(&coordinate, &repos, &cache)
            .await
            .unwrap();

        assert!(versions.is_empty());
    }

    #[tokio::test]
    async fn failed_fetch_leaves_no_staging_files() {
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "1.0").unwrap();
        seed_artifact(remote.path(), &coordinate, b"payload");
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        // A directory squatting on the destination makes the final rename fail
        fs::create_dir_all(cache.artifact_path(&coordinate)).unwrap();

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(remote.path()))];
        let err = transport.fetch(&coordinate, &repos, &cache).await.unwrap_err();
        assert!(matches!(err, TransportError::Io { .. }));

        let parent = cache.artifact_path(&coordinate).parent().unwrap().to_path_buf();
        let leftover = fs::read_dir(parent)
            .unwrap()
            .filter_map(Result::ok)
            .any(|entry| entry.file_name().to_string_lossy().ends_with(".part"));
        assert!(!leftover);
    }

    #[tokio::test]
    async fn manifest_cache_failure_leaves_no_staging_files() {
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "LATEST").unwrap();
        let manifest_dir = remote.path().join("org/demo/app");
        fs::create_dir_all(&manifest_dir).unwrap();
        fs::write(
            manifest_dir.join(layout::MANIFEST_FILE),
            r#"{"versions":["1.0"]}"#,
        )
        .unwrap();
        // A directory squatting on the cached manifest path blocks the rename
        let cached = cache_dir
            .path()
            .join("org/demo/app")
            .join(layout::MANIFEST_FILE);
        fs::create_dir_all(&cached).unwrap();

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(remote.path()))];
        let versions = transport
            .list_versions(&coordinate, &repos, &cache)
            .await
            .unwrap();
        assert_eq!(versions.len(), 1);

        let leftover = fs::read_dir(cached.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .any(|entry| entry.file_name().to_string_lossy().ends_with(".part"));
        assert!(!leftover);
    }

    #[tokio::test]
    async fn manifest_versions_that_name_paths_are_dropped() {
        let remote = TempDir::new().unwrap();
        let cache_dir = TempDir::new().unwrap();
        let cache = CacheSession::open(cache_dir.path()).unwrap();
        let coordinate = Coordinate::new("org.demo", "app", "jar", "LATEST").unwrap();
        let manifest_dir = remote.path().join("org/demo/app");
        fs::create_dir_all(&manifest_dir).unwrap();
        fs::write(
            manifest_dir.join(layout::MANIFEST_FILE),
            r#"{"versions":["1.0","../escape","..",""]}"#,
        )
        .unwrap();

        let transport = HttpTransport::default();
        let repos = [repo(&file_url(remote.path()))];
        let versions = transport
            .list_versions(&coordinate, &repos, &cache)
            .await
            .unwrap();

        let raw: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(raw, ["1.0"]);
    }

    #[test]
    fn staging_paths_do_not_collide() {
        let dest = Path::new("/cache/org/a/1.0/a-1.0.jar");
        let first = staging_path(dest);
        let second = staging_path(dest);
        assert_ne!(first, second);
        assert!(first.to_string_lossy().ends_with(".part"));
    }
}
