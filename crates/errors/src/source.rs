//! Package source registration errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum SourceError {
    #[error("failed to register trusted source {source_id}: {message}")]
    RegistrationFailed { source_id: String, message: String },

    #[error("signature verification failed for source {source_id}: {message}")]
    SignatureRejected { source_id: String, message: String },

    #[error("package index refresh failed: {message}")]
    IndexRefreshFailed { message: String },
}

impl UserFacingError for SourceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::RegistrationFailed { .. } => {
                Some("Verify the source identifier and that the key server is reachable.")
            }
            Self::SignatureRejected { .. } => {
                Some("The source signing key changed; inspect it before trusting the source.")
            }
            Self::IndexRefreshFailed { .. } => Some("Check mirror availability and rerun."),
        }
    }

    fn is_retryable(&self) -> bool {
        !matches!(self, Self::SignatureRejected { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::RegistrationFailed { .. } => "source.registration_failed",
            Self::SignatureRejected { .. } => "source.signature_rejected",
            Self::IndexRefreshFailed { .. } => "source.index_refresh_failed",
        })
    }
}
