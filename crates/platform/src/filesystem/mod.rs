//! Filesystem operations with explicit permission bits

use async_trait::async_trait;
use polyenv_errors::PlatformError;
use polyenv_types::FileMode;
use std::path::Path;

use crate::core::PlatformContext;

/// Trait for the filesystem operations the pipeline needs
#[async_trait]
pub trait FilesystemOperations: Send + Sync {
    /// Write `bytes` to `path` and leave it with exactly `mode`
    ///
    /// Existing content at `path` is replaced.
    async fn write_file(
        &self,
        ctx: &PlatformContext,
        path: &Path,
        bytes: &[u8],
        mode: FileMode,
    ) -> Result<(), PlatformError>;

    /// Current permission bits of `path`
    async fn mode(&self, ctx: &PlatformContext, path: &Path) -> Result<FileMode, PlatformError>;

    /// Size of a file in bytes
    async fn size(&self, ctx: &PlatformContext, path: &Path) -> Result<u64, PlatformError>;

    /// Create directory and all parent directories
    async fn create_dir_all(&self, ctx: &PlatformContext, path: &Path)
        -> Result<(), PlatformError>;

    /// Remove directory and all contents; a missing directory is not an error
    async fn remove_dir_all(&self, ctx: &PlatformContext, path: &Path)
        -> Result<(), PlatformError>;

    /// Check if a path exists
    async fn exists(&self, ctx: &PlatformContext, path: &Path) -> bool;
}
