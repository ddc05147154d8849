//! Declarative per-version package policy
//!
//! Which system packages a runtime needs is a table lookup, not branching in
//! the install loop: every version gets the base templates, and each rule adds
//! its templates to every version at or above its threshold. The table is
//! evaluated once into a [`RuntimePlan`].

use crate::package::PackageName;
use crate::version::{RuntimeVersion, RuntimeVersionSet};
use polyenv_errors::ConfigError;
use serde::{Deserialize, Serialize};

const VERSION_PLACEHOLDER: &str = "{version}";

/// Package name with an optional `{version}` placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageTemplate(String);

impl PackageTemplate {
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// # Errors
    ///
    /// Returns an error if the rendered name is not a valid package name.
    pub fn render(&self, version: RuntimeVersion) -> Result<PackageName, ConfigError> {
        PackageName::new(self.0.replace(VERSION_PLACEHOLDER, &version.to_string()))
    }
}

/// Extra packages for versions at or above `min_version`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRule {
    pub min_version: RuntimeVersion,
    pub packages: Vec<PackageTemplate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPolicyTable {
    pub base: Vec<PackageTemplate>,
    #[serde(default)]
    pub rules: Vec<VersionRule>,
}

impl Default for VersionPolicyTable {
    fn default() -> Self {
        Self {
            base: vec![
                PackageTemplate::new("python{version}"),
                PackageTemplate::new("python{version}-dev"),
            ],
            rules: vec![VersionRule {
                min_version: RuntimeVersion::new(3, 9),
                packages: vec![PackageTemplate::new("python{version}-distutils")],
            }],
        }
    }
}

impl VersionPolicyTable {
    /// Packages required for one version
    ///
    /// # Errors
    ///
    /// Returns an error if a template renders an invalid name.
    pub fn packages_for(&self, version: RuntimeVersion) -> Result<Vec<PackageName>, ConfigError> {
        self.base
            .iter()
            .chain(
                self.rules
                    .iter()
                    .filter(|rule| version >= rule.min_version)
                    .flat_map(|rule| rule.packages.iter()),
            )
            .map(|template| template.render(version))
            .collect()
    }

    /// Evaluate the table for every version
    ///
    /// # Errors
    ///
    /// Returns an error if the base list is empty or a template is invalid.
    pub fn resolve(&self, versions: &RuntimeVersionSet) -> Result<RuntimePlan, ConfigError> {
        if self.base.is_empty() {
            return Err(ConfigError::MissingField {
                field: "runtimes.packages".to_string(),
            });
        }

        let entries = versions
            .iter()
            .map(|version| {
                Ok(RuntimePackages {
                    version: *version,
                    packages: self.packages_for(*version)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(RuntimePlan { entries })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimePackages {
    pub version: RuntimeVersion,
    pub packages: Vec<PackageName>,
}

/// Resolved system packages per runtime, in version-set order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimePlan {
    pub entries: Vec<RuntimePackages>,
}

impl RuntimePlan {
    /// Every package across all runtimes, first occurrence order, no duplicates
    #[must_use]
    pub fn all_packages(&self) -> Vec<PackageName> {
        let mut all: Vec<PackageName> = Vec::new();
        for package in self.entries.iter().flat_map(|e| e.packages.iter()) {
            if !all.contains(package) {
                all.push(package.clone());
            }
        }
        all
    }
}
