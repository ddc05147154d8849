//! Package names and dependency lists

use polyenv_errors::ConfigError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single package name as understood by a package manager
///
/// Version pins (`pytest==7.4.0`) are part of the name; the only rule is that
/// the name is non-empty and carries no whitespace, since it is passed as a
/// single argument.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PackageName(String);

impl PackageName {
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) || name.starts_with('-') {
            return Err(ConfigError::InvalidValue {
                field: "package name".to_string(),
                value: name,
            });
        }
        Ok(Self(name))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for PackageName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// Dependencies installed identically into every runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackageList {
    packages: Vec<PackageName>,
}

impl PackageList {
    /// # Errors
    ///
    /// Returns an error if the list is empty or contains a duplicate.
    pub fn new(packages: Vec<PackageName>) -> Result<Self, ConfigError> {
        if packages.is_empty() {
            return Err(ConfigError::MissingField {
                field: "dependencies.packages".to_string(),
            });
        }
        for (i, package) in packages.iter().enumerate() {
            if packages[..i].contains(package) {
                return Err(ConfigError::InvalidValue {
                    field: "dependencies.packages".to_string(),
                    value: format!("{package} listed more than once"),
                });
            }
        }
        Ok(Self { packages })
    }

    /// # Errors
    ///
    /// Returns an error if any name is invalid or the list is invalid.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, ConfigError> {
        let packages = names
            .iter()
            .map(|n| PackageName::new(n.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(packages)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageName> {
        self.packages.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[PackageName] {
        &self.packages
    }
}

impl<'de> Deserialize<'de> for PackageList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let packages = Vec::<PackageName>::deserialize(deserializer)?;
        Self::new(packages).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_rules() {
        assert!(PackageName::new("pytest==7.4.0").is_ok());
        assert!(PackageName::new("").is_err());
        assert!(PackageName::new("two words").is_err());
        assert!(PackageName::new("--index-url").is_err());
    }

    #[test]
    fn test_package_list_rejects_duplicates() {
        assert!(PackageList::parse(&["pytest", "numpy", "pytest"]).is_err());
        assert!(PackageList::parse::<&str>(&[]).is_err());
        assert_eq!(PackageList::parse(&["pytest", "numpy"]).unwrap().len(), 2);
    }
}
