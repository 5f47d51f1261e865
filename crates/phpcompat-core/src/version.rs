//! PHP versions, configured target ranges and the version-range gate
//!
//! The gate is the only place that decides whether a configured target range
//! can conflict with a feature checkpoint. Both predicates are inert when no
//! range is configured.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{LazyLock, Mutex, PoisonError};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

static SINGLE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+\.\d+)$").expect("single version pattern is valid"));

static VERSION_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.\d+)?\s*-\s*(\d+\.\d+)?$").expect("version range pattern is valid")
});

/// A PHP version: `major.minor` with an optional patch component.
///
/// A missing patch compares equal to `.0`, so `5.2` and `5.2.0` are the same
/// checkpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u32,
    minor: u32,
    patch: Option<u32>,
}

impl Version {
    /// Create a two-component version
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor, patch: None }
    }

    /// Create a three-component version
    pub const fn with_patch(major: u32, minor: u32, patch: u32) -> Self {
        Self { major, minor, patch: Some(patch) }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn patch(&self) -> Option<u32> {
        self.patch
    }

    fn key(&self) -> (u32, u32, u32) {
        (self.major, self.minor, self.patch.unwrap_or(0))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionError::Invalid(s.to_string());

        let parts: Vec<&str> = s.split('.').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(invalid());
        }

        let mut numbers = Vec::with_capacity(parts.len());
        for part in &parts {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            numbers.push(part.parse::<u32>().map_err(|_| invalid())?);
        }

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers.get(2).copied(),
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

/// Version parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("invalid version '{0}', expected major.minor or major.minor.patch")]
    Invalid(String),
}

/// The configured window of PHP versions the scanned code must run on.
///
/// `None` bounds only occur when nothing is configured; open-ended range
/// strings fall back to [`TargetRange::FLOOR`] and [`TargetRange::CEILING`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRange {
    /// Lowest version that must be supported
    pub min: Option<Version>,

    /// Highest version that must be supported
    pub max: Option<Version>,
}

impl TargetRange {
    /// Lower bound used for `-A.B`
    pub const FLOOR: Version = Version::new(4, 0);

    /// Upper bound used for `X.Y-`
    pub const CEILING: Version = Version::new(99, 9);

    /// A range that disables every version-sensitive check
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// A range covering exactly one version
    pub fn exact(version: Version) -> Self {
        Self {
            min: Some(version),
            max: Some(version),
        }
    }

    /// An explicit range; `min > max` is a configuration error
    pub fn between(min: Version, max: Version) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvertedRange {
                min: min.to_string(),
                max: max.to_string(),
            });
        }

        Ok(Self {
            min: Some(min),
            max: Some(max),
        })
    }

    /// Parse a target-version string: `X.Y`, `X.Y-A.B`, `-A.B` or `X.Y-`.
    ///
    /// An empty string yields an unconfigured range.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::unconfigured());
        }

        let invalid = || ConfigError::InvalidTestVersion {
            value: raw.to_string(),
        };
        let bound = |text: &str| text.parse::<Version>().map_err(|_| invalid());

        if let Some(caps) = SINGLE_VERSION.captures(trimmed) {
            return Ok(Self::exact(bound(&caps[1])?));
        }

        if let Some(caps) = VERSION_RANGE.captures(trimmed) {
            let min = caps.get(1).map(|m| bound(m.as_str())).transpose()?;
            let max = caps.get(2).map(|m| bound(m.as_str())).transpose()?;

            if min.is_none() && max.is_none() {
                return Err(invalid());
            }

            return Self::between(min.unwrap_or(Self::FLOOR), max.unwrap_or(Self::CEILING));
        }

        Err(invalid())
    }

    /// Whether any bound is configured
    pub fn is_configured(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

impl fmt::Display for TargetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (None, None) => write!(f, "(none)"),
            (Some(min), Some(max)) if min == max => write!(f, "{}", min),
            (min, max) => {
                if let Some(min) = min {
                    write!(f, "{}", min)?;
                }
                write!(f, "-")?;
                if let Some(max) = max {
                    write!(f, "{}", max)?;
                }
                Ok(())
            }
        }
    }
}

/// Memoizes parsed target ranges by their raw configuration string.
///
/// Different files in one run may carry different configuration, so the cache
/// is keyed explicitly instead of holding a single slot. Failed parses are
/// cached too: the same malformed string always yields the same error.
#[derive(Debug, Default)]
pub struct TargetRangeCache {
    entries: Mutex<HashMap<String, Result<TargetRange, ConfigError>>>,
}

impl TargetRangeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a raw target-version string, parsing it at most once
    pub fn resolve(&self, raw: &str) -> Result<TargetRange, ConfigError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        entries
            .entry(raw.to_string())
            .or_insert_with(|| {
                let parsed = TargetRange::parse(raw);
                match &parsed {
                    Ok(range) => tracing::debug!(raw, %range, "parsed target range"),
                    Err(error) => tracing::debug!(raw, %error, "rejected target range"),
                }
                parsed
            })
            .clone()
    }

    /// Number of distinct strings seen so far
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Answers the two range questions every version-sensitive rule asks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionGate {
    range: TargetRange,
}

impl VersionGate {
    pub fn new(range: TargetRange) -> Self {
        Self { range }
    }

    pub fn range(&self) -> TargetRange {
        self.range
    }

    /// True when no range is configured and every versioned check is a no-op
    pub fn is_inert(&self) -> bool {
        !self.range.is_configured()
    }

    /// Does the range include anything at or below `version`?
    ///
    /// New-feature checks ask this: code that must still run on `version`
    /// cannot use something that only appeared after it.
    pub fn includes_at_or_below(&self, version: Version) -> bool {
        matches!(self.range.min, Some(min) if min <= version)
    }

    /// Does the range include anything at or above `version`?
    ///
    /// Deprecated/removed checks ask this.
    pub fn includes_at_or_above(&self, version: Version) -> bool {
        matches!(self.range.max, Some(max) if max >= version)
    }
}

impl From<TargetRange> for VersionGate {
    fn from(range: TargetRange) -> Self {
        Self::new(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn version_ordering() {
        assert!(v("5.2") < v("5.10"));
        assert!(v("5.0.1") < v("5.0.2"));
        assert_eq!(v("5.2"), v("5.2.0"));
        assert!(v("7.0") > v("5.6"));
        assert_eq!(v("5.0.2").to_string(), "5.0.2");
        assert_eq!(v("8.1").to_string(), "8.1");
    }

    #[test]
    fn invalid_versions() {
        assert!("5".parse::<Version>().is_err());
        assert!("5.x".parse::<Version>().is_err());
        assert!("5.1.2.3".parse::<Version>().is_err());
        assert!("alternative".parse::<Version>().is_err());
        assert!("".parse::<Version>().is_err());
    }

    #[test]
    fn parse_single_version() {
        let range = TargetRange::parse("5.6").unwrap();
        assert_eq!(range.min, Some(v("5.6")));
        assert_eq!(range.max, Some(v("5.6")));
    }

    #[test]
    fn parse_explicit_and_open_ranges() {
        let range = TargetRange::parse("5.3 - 7.4").unwrap();
        assert_eq!((range.min, range.max), (Some(v("5.3")), Some(v("7.4"))));

        let range = TargetRange::parse("-7.0").unwrap();
        assert_eq!((range.min, range.max), (Some(TargetRange::FLOOR), Some(v("7.0"))));

        let range = TargetRange::parse("7.0-").unwrap();
        assert_eq!((range.min, range.max), (Some(v("7.0")), Some(TargetRange::CEILING)));
    }

    #[test]
    fn parse_empty_is_unconfigured() {
        assert!(!TargetRange::parse("").unwrap().is_configured());
        assert!(!TargetRange::parse("   ").unwrap().is_configured());
    }

    #[test]
    fn parse_rejects_malformed() {
        for raw in ["5", "five", "5.3-7", "-", "5.3--7.0", "5.3.1"] {
            match TargetRange::parse(raw) {
                Err(ConfigError::InvalidTestVersion { value }) => assert_eq!(value, raw),
                other => panic!("expected invalid test version for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn parse_rejects_inverted_range() {
        let err = TargetRange::parse("7.0-5.6").unwrap_err();
        assert!(matches!(err, ConfigError::InvertedRange { .. }));
        assert!(err.to_string().contains("7.0"));
    }

    #[test]
    fn cache_memoizes_by_raw_string() {
        let cache = TargetRangeCache::new();
        let first = cache.resolve("5.6-7.0").unwrap();
        let second = cache.resolve("5.6-7.0").unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        let other = cache.resolve("8.0").unwrap();
        assert_ne!(first, other);
        assert!(cache.resolve("bogus").is_err());
        assert!(cache.resolve("bogus").is_err());
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn gate_is_inert_without_range() {
        let gate = VersionGate::default();
        assert!(gate.is_inert());
        assert!(!gate.includes_at_or_below(v("99.9")));
        assert!(!gate.includes_at_or_above(v("4.0")));
    }

    #[test]
    fn gate_predicates() {
        let gate = VersionGate::new(TargetRange::parse("5.3-5.4").unwrap());
        assert!(gate.includes_at_or_below(v("5.3")));
        assert!(gate.includes_at_or_below(v("7.0")));
        assert!(!gate.includes_at_or_below(v("5.2")));

        assert!(gate.includes_at_or_above(v("5.4")));
        assert!(gate.includes_at_or_above(v("5.0")));
        assert!(!gate.includes_at_or_above(v("5.5")));
    }

    #[test]
    fn version_serde_as_string() {
        let json = serde_json::to_string(&v("7.4")).unwrap();
        assert_eq!(json, "\"7.4\"");
        let back: Version = serde_json::from_str("\"5.0.2\"").unwrap();
        assert_eq!(back, Version::with_patch(5, 0, 2));
    }
}
