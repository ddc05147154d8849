//! Post-provision interpreter probe

use polyenv_errors::Error;
use polyenv_events::{AppEvent, EventEmitter, RuntimeEvent};
use polyenv_types::RuntimeVersion;

use crate::OpsCtx;

/// Confirm every provisioned interpreter answers `--version`
///
/// # Errors
///
/// Returns the first runtime that cannot be invoked.
pub async fn verify_runtimes(ctx: &OpsCtx) -> Result<Vec<(RuntimeVersion, String)>, Error> {
    let pctx = ctx.platform_context();
    let mut reported = Vec::with_capacity(ctx.params.versions.len());

    for &version in &ctx.params.versions {
        let output = ctx.platform.interpreter().probe(&pctx, version).await?;
        ctx.emit(AppEvent::Runtime(RuntimeEvent::Probed {
            version,
            reported: output.clone(),
        }));
        reported.push((version, output));
    }

    Ok(reported)
}
