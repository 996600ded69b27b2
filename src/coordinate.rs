//! Artifact coordinate parsing and formatting

use crate::error::{QuarryError, QuarryResult};
use std::fmt;

/// Extension assumed when a coordinate does not name one
pub const DEFAULT_EXTENSION: &str = "jar";

/// A fully-specified artifact coordinate
///
/// The canonical text form is `group:artifact:extension:version`. The
/// three-part form `group:artifact:version` implies the default
/// extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub extension: String,
    pub version: String,
}

impl Coordinate {
    /// Create a coordinate from parts, applying the same part checks
    /// as [`Coordinate::parse`]
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        extension: impl Into<String>,
        version: impl Into<String>,
    ) -> QuarryResult<Self> {
        let coordinate = Self {
            group: group.into(),
            artifact: artifact.into(),
            extension: extension.into(),
            version: version.into(),
        };
        coordinate.check_parts(&coordinate.to_string())?;
        Ok(coordinate)
    }

    /// Parse a coordinate from its text form
    pub fn parse(input: &str) -> QuarryResult<Self> {
        let parts: Vec<&str> = input.split(':').collect();
        let (group, artifact, extension, version) = match parts.as_slice() {
            [g, a, v] => (*g, *a, DEFAULT_EXTENSION, *v),
            [g, a, e, v] => (*g, *a, *e, *v),
            _ => {
                return Err(QuarryError::coordinate(
                    input,
                    "expected 3 or 4 colon-separated parts",
                ))
            }
        };
        let coordinate = Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            extension: extension.to_string(),
            version: version.to_string(),
        };
        coordinate.check_parts(input)?;
        Ok(coordinate)
    }

    /// Every part must be usable as a path segment; the group
    /// additionally becomes one segment per dot-separated label
    fn check_parts(&self, input: &str) -> QuarryResult<()> {
        for (name, value) in [
            ("group", &self.group),
            ("artifact", &self.artifact),
            ("extension", &self.extension),
            ("version", &self.version),
        ] {
            if value.is_empty() {
                return Err(QuarryError::coordinate(input, format!("empty {name}")));
            }
            if value.contains(['/', '\\']) {
                return Err(QuarryError::coordinate(
                    input,
                    format!("{name} must not contain path separators"),
                ));
            }
            if matches!(value.as_str(), "." | "..") {
                return Err(QuarryError::coordinate(
                    input,
                    format!("{name} must not be a dot segment"),
                ));
            }
        }
        if self.group.split('.').any(|label| label.is_empty()) {
            return Err(QuarryError::coordinate(input, "empty group label"));
        }
        Ok(())
    }

    /// Same coordinate with a different version
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group, self.artifact, self.extension, self.version
        )
    }
}

impl std::str::FromStr for Coordinate {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
