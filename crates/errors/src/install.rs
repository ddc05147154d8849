//! Package installation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InstallError {
    #[error("installation failed: {message}")]
    Failed { message: String },

    #[error("package not found: {package}")]
    PackageNotFound { package: String },

    #[error("package conflict: {message}")]
    Conflict { message: String },

    #[error("no packages specified")]
    NoPackagesSpecified,

    #[error("bootstrap of package manager for runtime {runtime} failed: {message}")]
    BootstrapFailed { runtime: String, message: String },

    #[error("dependency install for runtime {runtime} failed: {message}")]
    DependenciesFailed { runtime: String, message: String },

    #[error("runtime {runtime} is not invokable: {message}")]
    RuntimeUnavailable { runtime: String, message: String },

    #[error("cleanup failed: {message}")]
    CleanupFailed { message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::PackageNotFound { .. } => {
                Some("Check the package name and that the trusted source provides it.")
            }
            Self::Conflict { .. } => Some("Remove the conflicting package from the configuration."),
            Self::NoPackagesSpecified => Some("Add at least one package to the configuration."),
            Self::BootstrapFailed { .. } => {
                Some("Ensure the bootstrap script supports this interpreter version.")
            }
            Self::RuntimeUnavailable { .. } => {
                Some("The interpreter package installed but its binary is missing from PATH.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Failed { .. } | Self::BootstrapFailed { .. } | Self::DependenciesFailed { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Failed { .. } => "install.failed",
            Self::PackageNotFound { .. } => "install.package_not_found",
            Self::Conflict { .. } => "install.conflict",
            Self::NoPackagesSpecified => "install.no_packages",
            Self::BootstrapFailed { .. } => "install.bootstrap_failed",
            Self::DependenciesFailed { .. } => "install.dependencies_failed",
            Self::RuntimeUnavailable { .. } => "install.runtime_unavailable",
            Self::CleanupFailed { .. } => "install.cleanup_failed",
        })
    }
}
