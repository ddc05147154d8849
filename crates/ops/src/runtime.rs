//! Interpreter installation through the system package manager

use polyenv_errors::Error;
use polyenv_events::{AppEvent, EventEmitter, RuntimeEvent};
use polyenv_types::PackageName;

use crate::{with_retry, OpsCtx};

/// Install every runtime's packages in one package-manager transaction
///
/// The package set comes from the version policy table, already evaluated
/// into the run's plan. A package that cannot be resolved fails the whole
/// transaction; no runtime is skipped. Package caches are cleaned afterwards.
///
/// # Errors
///
/// Returns the install error (after retries when transient) or a cleanup
/// failure.
pub async fn install_runtimes(ctx: &OpsCtx) -> Result<Vec<PackageName>, Error> {
    let pctx = ctx.platform_context();
    let packages = ctx.params.plan.all_packages();
    let manager = ctx.platform.packages();

    ctx.emit(AppEvent::Runtime(RuntimeEvent::Installing {
        runtimes: ctx.params.versions.as_slice().to_vec(),
        packages: packages.clone(),
    }));
    tracing::info!(count = packages.len(), "installing runtime packages");

    with_retry(ctx, &ctx.params.retry, "install runtime packages", || {
        manager.install(&pctx, &packages)
    })
    .await?;
    ctx.emit(AppEvent::Runtime(RuntimeEvent::Installed {
        package_count: packages.len(),
    }));

    manager.cleanup(&pctx).await?;
    ctx.emit(AppEvent::Runtime(RuntimeEvent::CleanedUp));

    Ok(packages)
}
