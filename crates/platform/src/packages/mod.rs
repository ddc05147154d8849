//! System package manager operations

use async_trait::async_trait;
use polyenv_errors::Error;
use polyenv_types::PackageName;

use crate::core::PlatformContext;

/// The image's system package manager
///
/// Every method is a single attempt; callers decide whether to retry.
#[async_trait]
pub trait PackageManager: Send + Sync {
    /// Register a signed third-party package source
    async fn add_trusted_source(&self, ctx: &PlatformContext, source_id: &str)
        -> Result<(), Error>;

    /// Refresh the package index from all registered sources
    async fn refresh_index(&self, ctx: &PlatformContext) -> Result<(), Error>;

    /// Install packages without recommended extras
    async fn install(&self, ctx: &PlatformContext, packages: &[PackageName]) -> Result<(), Error>;

    /// Drop cached package lists and downloaded archives
    async fn cleanup(&self, ctx: &PlatformContext) -> Result<(), Error>;
}
