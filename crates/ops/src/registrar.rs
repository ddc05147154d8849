//! Trusted package source registration

use polyenv_errors::Error;
use polyenv_events::{AppEvent, EventEmitter, SourceEvent};

use crate::{with_retry, OpsCtx};

/// Register the configured source as trusted, then refresh the package index
///
/// Registering an already-trusted source succeeds. Both calls go through the
/// run's retry policy.
///
/// # Errors
///
/// Returns the registration or refresh error once retries are exhausted, or
/// immediately for a rejected signature.
pub async fn register_source(ctx: &OpsCtx) -> Result<(), Error> {
    let pctx = ctx.platform_context();
    let source_id = ctx.params.source_id.as_str();
    let packages = ctx.platform.packages();

    ctx.emit(AppEvent::Source(SourceEvent::Registering {
        source_id: source_id.to_string(),
    }));
    with_retry(ctx, &ctx.params.retry, "register source", || {
        packages.add_trusted_source(&pctx, source_id)
    })
    .await?;
    ctx.emit(AppEvent::Source(SourceEvent::Registered {
        source_id: source_id.to_string(),
    }));

    ctx.emit(AppEvent::Source(SourceEvent::IndexRefreshing));
    with_retry(ctx, &ctx.params.retry, "refresh package index", || {
        packages.refresh_index(&pctx)
    })
    .await?;
    ctx.emit(AppEvent::Source(SourceEvent::IndexRefreshed));

    Ok(())
}
