//! Error types for Quarry
//!
//! All modules use `QuarryResult<T>` as their return type.

use crate::transport::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Quarry operations
pub type QuarryResult<T> = Result<T, QuarryError>;

/// All errors that can occur in Quarry
#[derive(Error, Debug)]
pub enum QuarryError {
    // Precondition errors
    #[error("local repository does not exist: {0}")]
    LocalRepoMissing(PathBuf),

    // Resolution errors
    #[error("failed to resolve {coordinate}")]
    Resolution {
        coordinate: String,
        #[source]
        source: TransportError,
    },

    #[error("invalid coordinate '{input}': {reason}")]
    Coordinate { input: String, reason: String },

    // Configuration errors
    #[error("invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl QuarryError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a coordinate parse error
    pub fn coordinate(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Coordinate {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::LocalRepoMissing(_) => {
                Some("Create the directory first, or point --cache-dir at an existing one")
            }
            Self::Coordinate { .. } => {
                Some("Coordinates look like group:artifact:version or group:artifact:extension:version")
            }
            _ => None,
        }
    }
}
