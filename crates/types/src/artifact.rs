//! Artifact placement and permission policy

use polyenv_errors::{ConfigError, PermissionError};
use polyenv_hash::Hash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const EXEC_ALL: u32 = 0o111;
const WRITE_NON_OWNER: u32 = 0o022;
const SPECIAL_BITS: u32 = 0o7000;

/// Unix permission bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    /// Read and execute for everyone, write for no one
    pub const READ_EXECUTE_ALL: Self = Self(0o555);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & 0o7777)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_executable_by_all(self) -> bool {
        self.0 & EXEC_ALL == EXEC_ALL
    }

    #[must_use]
    pub const fn is_writable_by_non_owner(self) -> bool {
        self.0 & WRITE_NON_OWNER != 0
    }

    /// Setuid, setgid or sticky bit present
    #[must_use]
    pub const fn has_special_bits(self) -> bool {
        self.0 & SPECIAL_BITS != 0
    }

    /// Check the artifact policy: executable by all, writable by no group/other,
    /// no setuid/setgid/sticky bits
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn check_artifact_policy(self, path: &Path) -> Result<(), PermissionError> {
        if self.has_special_bits() {
            return Err(PermissionError::SpecialBits {
                path: path.display().to_string(),
                mode: self.0,
            });
        }
        if !self.is_executable_by_all() {
            return Err(PermissionError::NotExecutable {
                path: path.display().to_string(),
                mode: self.0,
            });
        }
        if self.is_writable_by_non_owner() {
            return Err(PermissionError::WritableByOthers {
                path: path.display().to_string(),
                mode: self.0,
            });
        }
        Ok(())
    }
}

impl Default for FileMode {
    fn default() -> Self {
        Self::READ_EXECUTE_ALL
    }
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

impl FromStr for FileMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
        u32::from_str_radix(digits, 8)
            .ok()
            .filter(|bits| *bits <= 0o7777)
            .map(Self)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "artifact.mode".to_string(),
                value: s.to_string(),
            })
    }
}

impl Serialize for FileMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FileMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The single prebuilt binary placed on the execution path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSpec {
    pub url: String,
    pub destination: PathBuf,
    pub mode: FileMode,
    /// Optional pinned BLAKE3 digest, checked before the mode is applied
    pub checksum: Option<Hash>,
}

impl ArtifactSpec {
    /// Validate placement against the environment's search path
    ///
    /// # Errors
    ///
    /// Returns an error if the destination is relative, its directory is not
    /// on `search_path`, or the mode violates the artifact policy.
    pub fn validate(&self, search_path: &[PathBuf]) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "artifact.url".to_string(),
            });
        }

        if !self.destination.is_absolute() || self.destination.file_name().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "artifact.destination".to_string(),
                value: self.destination.display().to_string(),
            });
        }

        let on_path = self
            .destination
            .parent()
            .is_some_and(|dir| search_path.iter().any(|p| p == dir));
        if !on_path {
            return Err(ConfigError::Invalid {
                message: format!(
                    "artifact destination {} is not on the search path",
                    self.destination.display()
                ),
            });
        }

        self.mode
            .check_artifact_policy(&self.destination)
            .map_err(|e| ConfigError::InvalidValue {
                field: "artifact.mode".to_string(),
                value: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(dest: &str, mode: u32) -> ArtifactSpec {
        ArtifactSpec {
            url: "https://example.com/tool".to_string(),
            destination: PathBuf::from(dest),
            mode: FileMode::from_bits(mode),
            checksum: None,
        }
    }

    fn search_path() -> Vec<PathBuf> {
        vec![PathBuf::from("/usr/local/bin"), PathBuf::from("/usr/bin")]
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("0555".parse::<FileMode>().unwrap(), FileMode::READ_EXECUTE_ALL);
        assert_eq!("0o755".parse::<FileMode>().unwrap().bits(), 0o755);
        assert!("999".parse::<FileMode>().is_err());
        assert_eq!(FileMode::READ_EXECUTE_ALL.to_string(), "0555");
    }

    #[test]
    fn test_policy() {
        assert!(FileMode::from_bits(0o555).check_artifact_policy(Path::new("/x")).is_ok());
        assert!(FileMode::from_bits(0o755).check_artifact_policy(Path::new("/x")).is_ok());
        assert!(matches!(
            FileMode::from_bits(0o775).check_artifact_policy(Path::new("/x")),
            Err(PermissionError::WritableByOthers { .. })
        ));
        assert!(matches!(
            FileMode::from_bits(0o550).check_artifact_policy(Path::new("/x")),
            Err(PermissionError::NotExecutable { .. })
        ));
        assert!(matches!(
            FileMode::from_bits(0o4555).check_artifact_policy(Path::new("/x")),
            Err(PermissionError::SpecialBits { .. })
        ));
    }

    #[test]
    fn test_destination_must_be_on_search_path() {
        assert!(spec("/usr/local/bin/tool", 0o555).validate(&search_path()).is_ok());
        assert!(spec("/opt/tool", 0o555).validate(&search_path()).is_err());
        assert!(spec("tool", 0o555).validate(&search_path()).is_err());
        assert!(spec("/usr/local/bin/tool", 0o777).validate(&search_path()).is_err());
        assert!(spec("/usr/local/bin/tool", 0o4555).validate(&search_path()).is_err());
    }
}
