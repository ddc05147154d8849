//! Per-runtime package manager bootstrap and dependency install

use polyenv_errors::Error;
use polyenv_events::{AppEvent, DependencyEvent, EventEmitter, FailureContext};
use polyenv_hash::verify_data;
use polyenv_platform::PlatformContext;
use polyenv_types::{FileMode, RuntimeProgress, RuntimeState, RuntimeVersion};
use std::path::{Path, PathBuf};

use crate::{with_retry, OpsCtx};

const SCRIPT_MODE: FileMode = FileMode::from_bits(0o644);
const DEFAULT_SCRIPT_NAME: &str = "bootstrap.py";

/// Bootstrap and install dependencies for each runtime, one at a time
///
/// Each runtime gets its own working directory under the work root, removed
/// again once the runtime is done. The first runtime to fail fails the run
/// and the remaining runtimes are never started.
///
/// # Errors
///
/// Returns the failing runtime's error.
pub async fn install_dependencies(ctx: &OpsCtx) -> Result<Vec<RuntimeProgress>, Error> {
    let pctx = ctx.platform_context();
    let mut finished = Vec::with_capacity(ctx.params.versions.len());

    for &version in &ctx.params.versions {
        let mut progress = RuntimeProgress::new(version);
        let workdir = ctx.params.work_root.join(version.to_string());

        let result = install_for_runtime(ctx, &pctx, &mut progress, &workdir).await;
        let cleanup = ctx.platform.filesystem().remove_dir_all(&pctx, &workdir).await;

        match (result, cleanup) {
            (Ok(()), Ok(())) => {
                ctx.emit(AppEvent::Dependency(DependencyEvent::WorkdirRemoved { version }));
                finished.push(progress);
            }
            (Ok(()), Err(err)) => {
                // Dependencies are in place; only the workdir is left behind.
                let err = Error::from(err);
                report_failure(ctx, version, &err);
                return Err(err);
            }
            (Err(err), cleanup) => {
                if let Err(cleanup_err) = cleanup {
                    ctx.emit_warning(format!(
                        "could not remove {}: {cleanup_err}",
                        workdir.display()
                    ));
                }
                fail(ctx, &mut progress, &err)?;
                return Err(err);
            }
        }
    }

    Ok(finished)
}

fn fail(ctx: &OpsCtx, progress: &mut RuntimeProgress, err: &Error) -> Result<(), Error> {
    transition(ctx, progress, RuntimeState::Failed)?;
    report_failure(ctx, progress.version, err);
    Ok(())
}

fn report_failure(ctx: &OpsCtx, version: RuntimeVersion, err: &Error) {
    ctx.emit(AppEvent::Dependency(DependencyEvent::Failed {
        version,
        failure: FailureContext::from_error(err),
    }));
    tracing::error!(runtime = %version, error = %err, "dependency install failed");
}

fn transition(ctx: &OpsCtx, progress: &mut RuntimeProgress, next: RuntimeState) -> Result<(), Error> {
    let from = progress.state;
    progress.transition(next)?;
    ctx.emit_state_changed(progress.version, from, next);
    Ok(())
}

fn script_name(url: &str) -> &str {
    url.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_SCRIPT_NAME)
}

async fn install_for_runtime(
    ctx: &OpsCtx,
    pctx: &PlatformContext,
    progress: &mut RuntimeProgress,
    workdir: &Path,
) -> Result<(), Error> {
    let version = progress.version;
    let fs = ctx.platform.filesystem();
    let interpreter = ctx.platform.interpreter();
    let retry = &ctx.params.retry;

    // Leftovers from an interrupted run would leak into this one.
    fs.remove_dir_all(pctx, workdir).await?;
    fs.create_dir_all(pctx, workdir).await?;
    ctx.emit(AppEvent::Dependency(DependencyEvent::WorkdirPrepared {
        version,
        path: workdir.to_path_buf(),
    }));

    let script = fetch_bootstrap(ctx, pctx, version, workdir).await?;
    with_retry(ctx, retry, &format!("bootstrap package manager for {version}"), || {
        interpreter.run_script(pctx, version, &script, workdir)
    })
    .await?;
    transition(ctx, progress, RuntimeState::Bootstrapped)?;

    let packages = ctx.params.packages.as_slice();
    ctx.emit(AppEvent::Dependency(DependencyEvent::Installing {
        version,
        packages: packages.to_vec(),
    }));
    with_retry(ctx, retry, &format!("install dependencies for {version}"), || {
        interpreter.install_packages(pctx, version, packages, workdir)
    })
    .await?;
    transition(ctx, progress, RuntimeState::DependenciesInstalled)?;

    Ok(())
}

/// Fetch, verify, then write the bootstrap script; never execute unverified
async fn fetch_bootstrap(
    ctx: &OpsCtx,
    pctx: &PlatformContext,
    version: RuntimeVersion,
    workdir: &Path,
) -> Result<PathBuf, Error> {
    let url = ctx.params.bootstrap.url_for(version);
    let bytes = with_retry(ctx, &ctx.params.retry, &format!("fetch {url}"), || {
        ctx.fetcher.fetch(&url)
    })
    .await?;

    let checksum = ctx.params.bootstrap.checksum_for(version);
    if let Some(expected) = checksum {
        verify_data(&bytes, expected, &url)?;
    }

    let script = workdir.join(script_name(&url));
    ctx.platform
        .filesystem()
        .write_file(pctx, &script, &bytes, SCRIPT_MODE)
        .await?;
    ctx.emit(AppEvent::Dependency(DependencyEvent::BootstrapFetched {
        version,
        url,
        verified: checksum.is_some(),
    }));

    Ok(script)
}
