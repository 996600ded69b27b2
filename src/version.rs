//! Version ordering and range matching
//!
//! Versions are compared segment-wise, not lexically: `10.0` sorts
//! above `9.0`, trailing zero segments are insignificant, and
//! qualifiers rank `alpha < beta < milestone < rc < SNAPSHOT <
//! release < sp`. Any version string parses; ordering never fails.

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Rank of the empty qualifier, i.e. a plain release
const RELEASE_RANK: u8 = 5;

/// Rank assigned to qualifiers with no defined ordering
const UNKNOWN_RANK: u8 = 7;

/// A parsed artifact version
///
/// Equality follows the ordering, so `1.0` and `1.0.0` compare equal
/// even though their text forms differ.
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    // Declared before Number so qualifiers sort below numeric segments
    Qualifier { rank: u8, canon: String },
    Number(u64),
}

impl Version {
    /// Parse a version string. Never fails; unrecognized tokens become
    /// qualifiers that sort after all known ones.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = tokenize(&raw);
        Self { raw, segments }
    }

    /// The original text form
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn tokenize(raw: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut token = String::new();
    let mut token_is_digits = false;
    for ch in raw.chars() {
        let is_digit = ch.is_ascii_digit();
        let is_alnum = ch.is_ascii_alphanumeric();
        if !is_alnum || (!token.is_empty() && is_digit != token_is_digits) {
            if !token.is_empty() {
                segments.push(segment(&token, token_is_digits));
            }
            token.clear();
        }
        if is_alnum {
            token_is_digits = is_digit;
            token.push(ch);
        }
    }
    if !token.is_empty() {
        segments.push(segment(&token, token_is_digits));
    }
    segments
}

fn segment(token: &str, is_digits: bool) -> Segment {
    if is_digits {
        Segment::Number(token.parse().unwrap_or(u64::MAX))
    } else {
        qualifier(token)
    }
}

fn qualifier(token: &str) -> Segment {
    let lower = token.to_ascii_lowercase();
    let (rank, canon) = match lower.as_str() {
        "alpha" | "a" => (0, "alpha"),
        "beta" | "b" => (1, "beta"),
        "milestone" | "m" => (2, "milestone"),
        "rc" | "cr" => (3, "rc"),
        "snapshot" => (4, "snapshot"),
        "" | "ga" | "final" | "release" => (RELEASE_RANK, ""),
        "sp" => (6, "sp"),
        _ => (UNKNOWN_RANK, lower.as_str()),
    };
    Segment::Qualifier {
        rank,
        canon: canon.to_string(),
    }
}

/// How a segment compares against a missing position in the shorter
/// version. Zero and the release qualifier pad out to equality.
fn cmp_to_null(seg: &Segment) -> Ordering {
    match seg {
        Segment::Number(0) => Ordering::Equal,
        Segment::Number(_) => Ordering::Greater,
        Segment::Qualifier { rank, .. } => rank.cmp(&RELEASE_RANK),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let ord = match (self.segments.get(i), other.segments.get(i)) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(a), None) => cmp_to_null(a),
                (None, Some(b)) => cmp_to_null(b).reverse(),
                (None, None) => Ordering::Equal,
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// True if the string is a range expression rather than a pinned version
pub fn is_range(version: &str) -> bool {
    version.starts_with('[') || version.starts_with('(')
}

/// Error for malformed range expressions
#[derive(Error, Debug)]
#[error("invalid version range '{input}': {reason}")]
pub struct RangeParseError {
    pub input: String,
    pub reason: String,
}

impl RangeParseError {
    fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// An interval of versions with optional bounds
///
/// Accepts the bracket grammar `[lo,hi]` / `(lo,hi)` with either bound
/// omitted for an unbounded side, and the single-version pin `[1.0]`.
#[derive(Debug, Clone)]
pub struct VersionRange {
    raw: String,
    lower: Option<Bound>,
    upper: Option<Bound>,
}

#[derive(Debug, Clone)]
struct Bound {
    version: Version,
    inclusive: bool,
}

impl VersionRange {
    /// Parse a range expression
    pub fn parse(input: &str) -> Result<Self, RangeParseError> {
        let trimmed = input.trim();
        let mut chars = trimmed.chars();
        let lower_inclusive = match chars.next() {
            Some('[') => true,
            Some('(') => false,
            _ => return Err(RangeParseError::new(input, "must start with '[' or '('")),
        };
        let upper_inclusive = match chars.next_back() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(RangeParseError::new(input, "must end with ']' or ')'")),
        };
        let interior = chars.as_str();
        if interior.contains(['[', ']', '(', ')']) {
            return Err(RangeParseError::new(input, "nested brackets"));
        }

        let bound = |text: &str, inclusive: bool| -> Option<Bound> {
            let text = text.trim();
            (!text.is_empty()).then(|| Bound {
                version: Version::new(text),
                inclusive,
            })
        };

        let (lower, upper) = match interior.split(',').collect::<Vec<_>>().as_slice() {
            [pin] => {
                if !(lower_inclusive && upper_inclusive) {
                    return Err(RangeParseError::new(input, "single version must use '[v]'"));
                }
                if pin.trim().is_empty() {
                    return Err(RangeParseError::new(input, "empty range"));
                }
                (bound(pin, true), bound(pin, true))
            }
            [lo, hi] => (bound(lo, lower_inclusive), bound(hi, upper_inclusive)),
            _ => return Err(RangeParseError::new(input, "more than one ','")),
        };

        if let (Some(lo), Some(hi)) = (&lower, &upper) {
            if lo.version > hi.version {
                return Err(RangeParseError::new(input, "lower bound above upper bound"));
            }
        }
        Ok(Self {
            raw: trimmed.to_string(),
            lower,
            upper,
        })
    }

    /// Whether a version falls inside the range
    pub fn contains(&self, version: &Version) -> bool {
        if let Some(lo) = &self.lower {
            let ok = match version.cmp(&lo.version) {
                Ordering::Greater => true,
                Ordering::Equal => lo.inclusive,
                Ordering::Less => false,
            };
            if !ok {
                return false;
            }
        }
        if let Some(hi) = &self.upper {
            let ok = match version.cmp(&hi.version) {
                Ordering::Less => true,
                Ordering::Equal => hi.inclusive,
                Ordering::Greater => false,
            };
            if !ok {
                return false;
            }
        }
        true
    }

    /// The highest of the given versions inside the range, if any
    pub fn max_matching(&self, versions: &[Version]) -> Option<Version> {
        versions.iter().filter(|v| self.contains(v)).max().cloned()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
