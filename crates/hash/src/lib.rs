#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! BLAKE3 digests for pinned downloads
//!
//! The bootstrap script and, optionally, the prebuilt artifact are checked
//! against a digest from the configuration before they touch the disk.

use polyenv_errors::{Error, IntegrityError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A BLAKE3 digest, written as 64 hex characters in config and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash(blake3::Hash);

impl Hash {
    #[must_use]
    pub fn from_data(data: &[u8]) -> Self {
        Self(blake3::hash(data))
    }

    /// # Errors
    ///
    /// Returns `IntegrityError::InvalidChecksum` unless `s` is exactly 64 hex
    /// characters.
    pub fn from_hex(s: &str) -> Result<Self, Error> {
        blake3::Hash::from_hex(s.trim()).map(Self).map_err(|e| {
            IntegrityError::InvalidChecksum {
                value: s.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Check fetched content against a pinned digest
///
/// # Errors
///
/// Returns `IntegrityError::ChecksumMismatch` naming `subject` when the digest differs.
pub fn verify_data(data: &[u8], expected: &Hash, subject: &str) -> Result<Hash, Error> {
    let actual = Hash::from_data(data);
    if actual != *expected {
        return Err(IntegrityError::ChecksumMismatch {
            subject: subject.to_string(),
            expected: expected.to_hex(),
            actual: actual.to_hex(),
        }
        .into());
    }
    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        let hash = Hash::from_data(b"hello world");
        assert_eq!(
            hash.to_hex(),
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
        assert_eq!(Hash::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn test_config_form_is_hex_string() {
        let hash = Hash::from_data(b"get-pip");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{hash}\""));
        assert!(serde_json::from_str::<Hash>("\"abcd\"").is_err());
        assert!(Hash::from_hex("zz").is_err());
    }

    #[test]
    fn test_verify_data() {
        let expected = Hash::from_data(b"get-pip");
        assert!(verify_data(b"get-pip", &expected, "bootstrap").is_ok());

        let err = verify_data(b"tampered", &expected, "bootstrap").unwrap_err();
        assert!(matches!(
            err,
            Error::Integrity(IntegrityError::ChecksumMismatch { ref subject, .. }) if subject == "bootstrap"
        ));
    }
}
