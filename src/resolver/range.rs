//! Version pinning for ranges and LATEST
//!
//! Resolution works on pinned versions. A coordinate asking for
//! `LATEST` or a bracket range is pinned here to the highest
//! advertised version that matches, before any artifact is fetched.

use crate::coordinate::Coordinate;
use crate::resolver::registry::RepositoryDescriptor;
use crate::resolver::session::CacheSession;
use crate::transport::{Transport, TransportError};
use crate::version::{self, VersionRange};
use tracing::debug;

/// Version keyword meaning "the highest version available"
pub const LATEST: &str = "LATEST";

/// Range that LATEST expands to
pub const OPEN_RANGE: &str = "(0.0,]";

/// Pin a coordinate's version if it is LATEST or a range.
///
/// Pinned coordinates pass through untouched. When no advertised
/// version matches, the returned coordinate carries the range it
/// queried; the miss surfaces later, when fetching it fails.
pub async fn pin_version(
    coordinate: &Coordinate,
    repositories: &[RepositoryDescriptor],
    cache: &CacheSession,
    transport: &dyn Transport,
) -> Result<Coordinate, TransportError> {
    let requested = coordinate.version.as_str();
    let expr = if requested.eq_ignore_ascii_case(LATEST) {
        OPEN_RANGE
    } else if version::is_range(requested) {
        requested
    } else {
        return Ok(coordinate.clone());
    };

    let range = VersionRange::parse(expr)?;
    let advertised = transport
        .list_versions(coordinate, repositories, cache)
        .await?;
    match range.max_matching(&advertised) {
        Some(best) => {
            debug!("pinned {coordinate} to {best}");
            Ok(coordinate.with_version(best.as_str()))
        }
        None => {
            debug!("no advertised version matches {range} for {coordinate}");
            Ok(coordinate.with_version(expr))
        }
    }
}
