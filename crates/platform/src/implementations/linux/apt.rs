//! apt-based system package manager

use async_trait::async_trait;
use polyenv_errors::{Error, InstallError, SourceError};
use polyenv_events::EventEmitter;
use polyenv_types::PackageName;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::PlatformContext;
use crate::packages::PackageManager;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

const APT_LISTS_DIR: &str = "/var/lib/apt/lists";

/// Package manager for Debian-family images
pub struct AptPackageManager {
    process: Arc<dyn ProcessOperations>,
    lists_dir: PathBuf,
}

impl AptPackageManager {
    #[must_use]
    pub fn new(process: Arc<dyn ProcessOperations>) -> Self {
        Self {
            process,
            lists_dir: PathBuf::from(APT_LISTS_DIR),
        }
    }

    /// Override where cached package lists live
    #[must_use]
    pub fn with_lists_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lists_dir = dir.into();
        self
    }

    fn command(&self, program: &str) -> PlatformCommand {
        let mut cmd = self.process.create_command(program);
        cmd.env("DEBIAN_FRONTEND", "noninteractive");
        cmd
    }

    async fn run(&self, ctx: &PlatformContext, cmd: PlatformCommand) -> Result<CommandOutput, Error> {
        self.process.execute_command(ctx, cmd).await
    }
}

fn mentions_signature_problem(stderr: &str) -> bool {
    stderr.contains("NO_PUBKEY")
        || stderr.contains("is not signed")
        || stderr.contains("EXPKEYSIG")
        || stderr.contains("BADSIG")
}

/// First package apt reports it could not locate
fn missing_package(stderr: &str) -> Option<String> {
    stderr.lines().find_map(|line| {
        line.split_once("Unable to locate package ")
            .map(|(_, name)| name.trim().to_string())
    })
}

#[async_trait]
impl PackageManager for AptPackageManager {
    async fn add_trusted_source(
        &self,
        ctx: &PlatformContext,
        source_id: &str,
    ) -> Result<(), Error> {
        let mut cmd = self.command("add-apt-repository");
        cmd.args(["-y", source_id]);
        let output = self.run(ctx, cmd).await?;
        if output.success() {
            return Ok(());
        }

        let stderr = output.stderr_lossy().trim().to_string();
        if mentions_signature_problem(&stderr) {
            Err(SourceError::SignatureRejected {
                source_id: source_id.to_string(),
                message: stderr,
            }
            .into())
        } else {
            Err(SourceError::RegistrationFailed {
                source_id: source_id.to_string(),
                message: stderr,
            }
            .into())
        }
    }

    async fn refresh_index(&self, ctx: &PlatformContext) -> Result<(), Error> {
        let mut cmd = self.command("apt-get");
        cmd.arg("update");
        let output = self.run(ctx, cmd).await?;
        if output.success() {
            return Ok(());
        }

        let stderr = output.stderr_lossy().trim().to_string();
        if mentions_signature_problem(&stderr) {
            Err(SourceError::SignatureRejected {
                source_id: "package index".to_string(),
                message: stderr,
            }
            .into())
        } else {
            Err(SourceError::IndexRefreshFailed { message: stderr }.into())
        }
    }

    async fn install(&self, ctx: &PlatformContext, packages: &[PackageName]) -> Result<(), Error> {
        if packages.is_empty() {
            return Err(InstallError::NoPackagesSpecified.into());
        }

        let mut cmd = self.command("apt-get");
        cmd.args(["install", "-y", "--no-install-recommends"])
            .args(packages.iter().map(PackageName::as_str));
        let output = self.run(ctx, cmd).await?;
        if output.success() {
            return Ok(());
        }

        let stderr = output.stderr_lossy();
        match missing_package(&stderr) {
            Some(package) => Err(InstallError::PackageNotFound { package }.into()),
            None => Err(InstallError::Failed {
                message: stderr.trim().to_string(),
            }
            .into()),
        }
    }

    async fn cleanup(&self, ctx: &PlatformContext) -> Result<(), Error> {
        let mut cmd = self.command("apt-get");
        cmd.arg("clean");
        let output = self.run(ctx, cmd.clone()).await?;
        output.into_checked(&cmd).map_err(|e| InstallError::CleanupFailed {
            message: e.to_string(),
        })?;

        let mut entries = match tokio::fs::read_dir(&self.lists_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(InstallError::CleanupFailed {
                    message: format!("{}: {e}", self.lists_dir.display()),
                }
                .into())
            }
        };

        let mut removed = 0usize;
        while let Some(entry) = entries.next_entry().await.map_err(|e| InstallError::CleanupFailed {
            message: e.to_string(),
        })? {
            let path = entry.path();
            let result = if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            result.map_err(|e| InstallError::CleanupFailed {
                message: format!("{}: {e}", path.display()),
            })?;
            removed += 1;
        }

        ctx.emit_debug(format!(
            "removed {removed} cached package list entries from {}",
            self.lists_dir.display()
        ));
        Ok(())
    }
}
