//! Versioned `python{major.minor}` interpreters

use async_trait::async_trait;
use polyenv_errors::{Error, InstallError};
use polyenv_types::{PackageName, RuntimeVersion};
use std::path::Path;
use std::sync::Arc;

use crate::core::PlatformContext;
use crate::interpreter::InterpreterOperations;
use crate::process::{PlatformCommand, ProcessOperations};

/// Interpreters installed side by side as `python3.7`, `python3.8`, ...
pub struct PythonInterpreter {
    process: Arc<dyn ProcessOperations>,
}

impl PythonInterpreter {
    #[must_use]
    pub fn new(process: Arc<dyn ProcessOperations>) -> Self {
        Self { process }
    }

    /// Executable name for a version
    #[must_use]
    pub fn program(version: RuntimeVersion) -> String {
        format!("python{version}")
    }

    fn command(&self, version: RuntimeVersion, workdir: &Path) -> PlatformCommand {
        let mut cmd = self.process.create_command(&Self::program(version));
        let workdir = workdir.display().to_string();
        cmd.current_dir(&workdir)
            .env("TMPDIR", workdir)
            .env("PIP_NO_CACHE_DIR", "1")
            .env("PIP_DISABLE_PIP_VERSION_CHECK", "1");
        cmd
    }
}

fn missing_distribution(stderr: &str) -> Option<String> {
    stderr.lines().find_map(|line| {
        line.split_once("No matching distribution found for ")
            .map(|(_, name)| name.trim().to_string())
    })
}

#[async_trait]
impl InterpreterOperations for PythonInterpreter {
    async fn run_script(
        &self,
        ctx: &PlatformContext,
        version: RuntimeVersion,
        script: &Path,
        workdir: &Path,
    ) -> Result<(), Error> {
        let mut cmd = self.command(version, workdir);
        cmd.arg(script.display().to_string());

        let output = self
            .process
            .execute_command(ctx, cmd)
            .await
            .map_err(|e| InstallError::RuntimeUnavailable {
                runtime: version.to_string(),
                message: e.to_string(),
            })?;
        if output.success() {
            Ok(())
        } else {
            Err(InstallError::BootstrapFailed {
                runtime: version.to_string(),
                message: output.stderr_lossy().trim().to_string(),
            }
            .into())
        }
    }

    async fn install_packages(
        &self,
        ctx: &PlatformContext,
        version: RuntimeVersion,
        packages: &[PackageName],
        workdir: &Path,
    ) -> Result<(), Error> {
        if packages.is_empty() {
            return Err(InstallError::NoPackagesSpecified.into());
        }

        let mut cmd = self.command(version, workdir);
        cmd.args(["-m", "pip", "install", "--no-cache-dir"])
            .args(packages.iter().map(PackageName::as_str));

        let output = self
            .process
            .execute_command(ctx, cmd)
            .await
            .map_err(|e| InstallError::RuntimeUnavailable {
                runtime: version.to_string(),
                message: e.to_string(),
            })?;
        if output.success() {
            return Ok(());
        }

        let stderr = output.stderr_lossy();
        match missing_distribution(&stderr) {
            Some(package) => Err(InstallError::PackageNotFound { package }.into()),
            None => Err(InstallError::DependenciesFailed {
                runtime: version.to_string(),
                message: stderr.trim().to_string(),
            }
            .into()),
        }
    }

    async fn probe(&self, ctx: &PlatformContext, version: RuntimeVersion) -> Result<String, Error> {
        let mut cmd = self.process.create_command(&Self::program(version));
        cmd.arg("--version");

        let unavailable = |message: String| InstallError::RuntimeUnavailable {
            runtime: version.to_string(),
            message,
        };
        let output = self
            .process
            .execute_command(ctx, cmd.clone())
            .await
            .map_err(|e| unavailable(e.to_string()))?
            .into_checked(&cmd)
            .map_err(|e| unavailable(e.to_string()))?;

        let stdout = output.stdout_lossy();
        let reported = if stdout.trim().is_empty() {
            output.stderr_lossy()
        } else {
            stdout
        };
        Ok(reported.trim().to_string())
    }
}
