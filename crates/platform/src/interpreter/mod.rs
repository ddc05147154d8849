//! Interpreter invocation

use async_trait::async_trait;
use polyenv_errors::Error;
use polyenv_types::{PackageName, RuntimeVersion};
use std::path::Path;

use crate::core::PlatformContext;

/// Runs a specific installed interpreter version
#[async_trait]
pub trait InterpreterOperations: Send + Sync {
    /// Execute `script` with the interpreter, using `workdir` for scratch files
    async fn run_script(
        &self,
        ctx: &PlatformContext,
        version: RuntimeVersion,
        script: &Path,
        workdir: &Path,
    ) -> Result<(), Error>;

    /// Install dependency packages into this interpreter, bypassing any cache
    async fn install_packages(
        &self,
        ctx: &PlatformContext,
        version: RuntimeVersion,
        packages: &[PackageName],
        workdir: &Path,
    ) -> Result<(), Error>;

    /// Ask the interpreter for its version string
    async fn probe(&self, ctx: &PlatformContext, version: RuntimeVersion) -> Result<String, Error>;
}
