#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for polyenv
//!
//! Errors are grouped by provisioning domain. Every domain error converts into
//! the cross-crate [`Error`], and every failure is fatal to the provisioning
//! run; retry decisions for package operations consult
//! [`UserFacingError::is_retryable`].

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod install;
pub mod integrity;
pub mod network;
pub mod permission;
pub mod platform;
pub mod source;

// Re-export all error types at the root
pub use config::ConfigError;
pub use install::InstallError;
pub use integrity::IntegrityError;
pub use network::NetworkError;
pub use permission::PermissionError;
pub use platform::PlatformError;
pub use source::SourceError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("install error: {0}")]
    Install(#[from] InstallError),

    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("permission error: {0}")]
    Permission(#[from] PermissionError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        #[cfg_attr(feature = "serde", serde(skip, default = "io_kind_other"))]
        kind: std::io::ErrorKind,
        message: String,
    },
}

#[cfg(feature = "serde")]
fn io_kind_other() -> std::io::ErrorKind {
    std::io::ErrorKind::Other
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}

/// Result type alias for polyenv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Whether retrying the same operation is likely to succeed.
    fn is_retryable(&self) -> bool {
        false
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Network(err) => err.user_message(),
            Error::Source(err) => err.user_message(),
            Error::Install(err) => err.user_message(),
            Error::Permission(err) => err.user_message(),
            Error::Config(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_hint(),
            Error::Source(err) => err.user_hint(),
            Error::Install(err) => err.user_hint(),
            Error::Permission(err) => err.user_hint(),
            Error::Config(err) => err.user_hint(),
            Error::Integrity(_) => {
                Some("Upstream content changed; review it before updating the pinned checksum.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(err) => err.is_retryable(),
            Error::Source(err) => err.is_retryable(),
            Error::Install(err) => err.is_retryable(),
            Error::Platform(PlatformError::CommandFailed { .. }) => true,
            Error::Io { kind, .. } => matches!(
                kind,
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionReset
            ),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Network(err) => err.user_code(),
            Error::Source(err) => err.user_code(),
            Error::Install(err) => err.user_code(),
            Error::Permission(err) => err.user_code(),
            Error::Config(err) => err.user_code(),
            Error::Integrity(_) => Some("integrity.checksum"),
            Error::Platform(_) => Some("error.platform"),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
