//! Filesystem operations on a POSIX filesystem

use async_trait::async_trait;
use polyenv_errors::PlatformError;
use polyenv_events::{AppEvent, EventEmitter, PlatformEvent};
use polyenv_types::FileMode;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::PlatformContext;
use crate::filesystem::FilesystemOperations;

/// Linux implementation of filesystem operations
#[derive(Debug, Default)]
pub struct LinuxFilesystemOperations;

impl LinuxFilesystemOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> PlatformError {
    if err.kind() == std::io::ErrorKind::PermissionDenied {
        PlatformError::PermissionDenied {
            operation: format!("{operation} {}", path.display()),
            message: err.to_string(),
        }
    } else {
        PlatformError::FilesystemOperationFailed {
            operation: format!("{operation} {}", path.display()),
            message: err.to_string(),
        }
    }
}

/// Sibling staging path so the final rename stays on one filesystem
fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.polyenv-partial"))
}

#[async_trait]
impl FilesystemOperations for LinuxFilesystemOperations {
    async fn write_file(
        &self,
        ctx: &PlatformContext,
        path: &Path,
        bytes: &[u8],
        mode: FileMode,
    ) -> Result<(), PlatformError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| fs_error("create_dir_all", parent, &e))?;
        }

        let staging = staging_path(path);
        fs::write(&staging, bytes)
            .await
            .map_err(|e| fs_error("write", &staging, &e))?;

        // Set the mode before the rename so the final path never exists with
        // default permissions.
        if let Err(e) =
            fs::set_permissions(&staging, std::fs::Permissions::from_mode(mode.bits())).await
        {
            let _ = fs::remove_file(&staging).await;
            return Err(fs_error("set_permissions", &staging, &e));
        }

        if let Err(e) = fs::rename(&staging, path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(fs_error("rename", path, &e));
        }

        ctx.emit(AppEvent::Platform(PlatformEvent::FileWritten {
            path: path.to_path_buf(),
            bytes: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            mode: mode.bits(),
        }));
        Ok(())
    }

    async fn mode(&self, _ctx: &PlatformContext, path: &Path) -> Result<FileMode, PlatformError> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| fs_error("metadata", path, &e))?;
        Ok(FileMode::from_bits(metadata.permissions().mode()))
    }

    async fn size(&self, _ctx: &PlatformContext, path: &Path) -> Result<u64, PlatformError> {
        let metadata = fs::metadata(path)
            .await
            .map_err(|e| fs_error("metadata", path, &e))?;
        Ok(metadata.len())
    }

    async fn create_dir_all(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| fs_error("create_dir_all", path, &e))
    }

    async fn remove_dir_all(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
    ) -> Result<(), PlatformError> {
        match fs::remove_dir_all(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(fs_error("remove_dir_all", path, &e)),
        }
    }

    async fn exists(&self, _ctx: &PlatformContext, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_file_sets_exact_mode() {
        let temp = TempDir::new().unwrap();
        let ops = LinuxFilesystemOperations::new();
        let ctx = PlatformContext::default();
        let path = temp.path().join("bin").join("tool");

        ops.write_file(&ctx, &path, b"#!/bin/sh\n", FileMode::READ_EXECUTE_ALL)
            .await
            .unwrap();

        assert_eq!(ops.mode(&ctx, &path).await.unwrap(), FileMode::READ_EXECUTE_ALL);
        assert_eq!(ops.size(&ctx, &path).await.unwrap(), 10);
        assert!(!ops.exists(&ctx, &staging_path(&path)).await);
    }

    #[tokio::test]
    async fn test_write_file_replaces_read_only_target() {
        let temp = TempDir::new().unwrap();
        let ops = LinuxFilesystemOperations::new();
        let ctx = PlatformContext::default();
        let path = temp.path().join("tool");

        ops.write_file(&ctx, &path, b"v1", FileMode::READ_EXECUTE_ALL)
            .await
            .unwrap();
        ops.write_file(&ctx, &path, b"v2", FileMode::READ_EXECUTE_ALL)
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"v2");
        assert_eq!(ops.mode(&ctx, &path).await.unwrap(), FileMode::READ_EXECUTE_ALL);
    }

    #[tokio::test]
    async fn test_remove_missing_dir_is_ok() {
        let temp = TempDir::new().unwrap();
        let ops = LinuxFilesystemOperations::new();
        let ctx = PlatformContext::default();
        let dir = temp.path().join("work").join("3.8");

        ops.create_dir_all(&ctx, &dir).await.unwrap();
        assert!(ops.exists(&ctx, &dir).await);
        ops.remove_dir_all(&ctx, &dir).await.unwrap();
        assert!(!ops.exists(&ctx, &dir).await);
        ops.remove_dir_all(&ctx, &dir).await.unwrap();
    }
}
