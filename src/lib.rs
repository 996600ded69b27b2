//! Quarry - Artifact Coordinate Resolver
//!
//! Resolves Maven-style coordinates (`group:artifact:extension:version`)
//! to files in a local cache, negotiating version ranges and falling
//! back across repositories.

pub mod cli;
pub mod config;
pub mod coordinate;
pub mod error;
pub mod resolver;
pub mod transport;
pub mod ui;
pub mod version;

pub use coordinate::Coordinate;
pub use error::{QuarryError, QuarryResult};
pub use resolver::{ArtifactStream, ResolvedArtifact, Resolver};
pub use version::{Version, VersionRange};
