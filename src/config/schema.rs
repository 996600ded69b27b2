//! Configuration schema for Quarry
//!
//! Configuration is stored at `~/.config/quarry/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Repository every fresh configuration starts with
pub const DEFAULT_REPOSITORY: &str = "https://repo1.maven.org/maven2/";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local cache settings
    pub cache: CacheConfig,

    /// Remote repository settings
    pub repositories: RepositoriesConfig,

    /// Network settings
    pub network: NetworkConfig,
}

/// Local cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory; defaults to the platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

/// Remote repository configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoriesConfig {
    /// Repository URLs, tried in order
    pub urls: Vec<String>,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            urls: vec![DEFAULT_REPOSITORY.to_string()],
        }
    }
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}
