//! Artifact permission errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum PermissionError {
    #[error("failed to set mode {mode:o} on {path}: {message}")]
    SetModeFailed {
        path: String,
        mode: u32,
        message: String,
    },

    #[error("{path} has mode {actual:o}, expected {expected:o}")]
    ModeMismatch {
        path: String,
        expected: u32,
        actual: u32,
    },

    #[error("{path} is writable by non-owners (mode {mode:o})")]
    WritableByOthers { path: String, mode: u32 },

    #[error("{path} is not executable by all principals (mode {mode:o})")]
    NotExecutable { path: String, mode: u32 },

    #[error("{path} carries setuid, setgid or sticky bits (mode {mode:o})")]
    SpecialBits { path: String, mode: u32 },
}

impl UserFacingError for PermissionError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::SetModeFailed { .. } => {
                Some("Provisioning must run as the owner of the artifact destination.")
            }
            _ => Some("The artifact must not ship with an unusable or writable mode."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::SetModeFailed { .. } => "permission.set_mode_failed",
            Self::ModeMismatch { .. } => "permission.mode_mismatch",
            Self::WritableByOthers { .. } => "permission.writable_by_others",
            Self::NotExecutable { .. } => "permission.not_executable",
            Self::SpecialBits { .. } => "permission.special_bits",
        })
    }
}
