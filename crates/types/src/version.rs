//! Interpreter version identifiers
//!
//! Runtimes are addressed by `major.minor` only: that is the granularity at
//! which the upstream source publishes side-by-side interpreter packages
//! (`python3.8`, `python3.9`, ...).

use polyenv_errors::ConfigError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A `major.minor` interpreter version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeVersion {
    pub major: u16,
    pub minor: u16,
}

impl RuntimeVersion {
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for RuntimeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for RuntimeVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            field: "runtime version".to_string(),
            value: s.to_string(),
        };

        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        let major = major.parse::<u16>().map_err(|_| invalid())?;
        let minor = minor.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self { major, minor })
    }
}

impl Serialize for RuntimeVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RuntimeVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordered, duplicate-free, non-empty list of runtime versions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RuntimeVersionSet {
    versions: Vec<RuntimeVersion>,
}

impl RuntimeVersionSet {
    /// Build a version set, keeping the caller's order
    ///
    /// # Errors
    ///
    /// Returns an error if `versions` is empty or names a version twice.
    pub fn new(versions: Vec<RuntimeVersion>) -> Result<Self, ConfigError> {
        if versions.is_empty() {
            return Err(ConfigError::MissingField {
                field: "runtimes.versions".to_string(),
            });
        }

        for (i, version) in versions.iter().enumerate() {
            if versions[..i].contains(version) {
                return Err(ConfigError::InvalidValue {
                    field: "runtimes.versions".to_string(),
                    value: format!("{version} listed more than once"),
                });
            }
        }

        Ok(Self { versions })
    }

    /// Parse a list of `major.minor` strings
    ///
    /// # Errors
    ///
    /// Returns an error if any entry fails to parse or the set is invalid.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self, ConfigError> {
        let versions = values
            .iter()
            .map(|v| v.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(versions)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuntimeVersion> {
        self.versions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    #[must_use]
    pub fn contains(&self, version: &RuntimeVersion) -> bool {
        self.versions.contains(version)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[RuntimeVersion] {
        &self.versions
    }
}

impl<'a> IntoIterator for &'a RuntimeVersionSet {
    type Item = &'a RuntimeVersion;
    type IntoIter = std::slice::Iter<'a, RuntimeVersion>;

    fn into_iter(self) -> Self::IntoIter {
        self.versions.iter()
    }
}

impl<'de> Deserialize<'de> for RuntimeVersionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let versions = Vec::<RuntimeVersion>::deserialize(deserializer)?;
        Self::new(versions).map_err(serde::de::Error::custom)
    }
}
