//! Platform-specific operation errors

use crate::{InstallError, SourceError};
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlatformError {
    #[error("filesystem operation failed: {operation} - {message}")]
    FilesystemOperationFailed { operation: String, message: String },

    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command {command} exited with status {code:?}: {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("permission denied: {operation} - {message}")]
    PermissionDenied { operation: String, message: String },
}

impl From<PlatformError> for InstallError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::CommandFailed { stderr, .. } => InstallError::Failed { message: stderr },
            _ => InstallError::Failed {
                message: err.to_string(),
            },
        }
    }
}

impl From<PlatformError> for SourceError {
    fn from(err: PlatformError) -> Self {
        SourceError::IndexRefreshFailed {
            message: err.to_string(),
        }
    }
}
