//! Single-attempt artifact fetch and placement

use polyenv_errors::{Error, PermissionError};
use polyenv_events::{AppEvent, ArtifactEvent, EventEmitter, FailureContext};
use polyenv_hash::{verify_data, Hash};
use polyenv_types::ArtifactReport;

use crate::OpsCtx;

/// Fetch the prebuilt artifact, place it, and check its permission bits
///
/// The fetch is attempted exactly once. When a checksum is configured the
/// content must match it before anything is written. After writing, the mode
/// is read back: the file must carry exactly the configured mode, be
/// executable by everyone and writable by no one but the owner.
///
/// # Errors
///
/// Returns a network error for a failed fetch, an integrity error for a
/// checksum mismatch, or a permission error when the postcondition fails.
pub async fn fetch_artifact(ctx: &OpsCtx) -> Result<ArtifactReport, Error> {
    let pctx = ctx.platform_context();
    let spec = &ctx.params.artifact;
    let fs = ctx.platform.filesystem();

    ctx.emit(AppEvent::Artifact(ArtifactEvent::Fetching {
        url: spec.url.clone(),
    }));
    let bytes = match ctx.fetcher.fetch(&spec.url).await {
        Ok(bytes) => bytes,
        Err(err) => {
            ctx.emit(AppEvent::Artifact(ArtifactEvent::FetchFailed {
                url: spec.url.clone(),
                failure: FailureContext::from_error(&err),
            }));
            return Err(err);
        }
    };
    ctx.emit(AppEvent::Artifact(ArtifactEvent::Fetched {
        url: spec.url.clone(),
        size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
    }));

    let hash = match &spec.checksum {
        Some(expected) => {
            let actual = verify_data(&bytes, expected, &spec.url)?;
            ctx.emit(AppEvent::Artifact(ArtifactEvent::ChecksumVerified {
                blake3: actual.to_hex(),
            }));
            actual
        }
        None => {
            ctx.emit(AppEvent::Artifact(ArtifactEvent::ChecksumSkipped {
                url: spec.url.clone(),
            }));
            Hash::from_data(&bytes)
        }
    };

    fs.write_file(&pctx, &spec.destination, &bytes, spec.mode)
        .await?;

    let actual = fs.mode(&pctx, &spec.destination).await?;
    if actual != spec.mode {
        return Err(PermissionError::ModeMismatch {
            path: spec.destination.display().to_string(),
            expected: spec.mode.bits(),
            actual: actual.bits(),
        }
        .into());
    }
    actual.check_artifact_policy(&spec.destination)?;
    let size = fs.size(&pctx, &spec.destination).await?;

    ctx.emit(AppEvent::Artifact(ArtifactEvent::Installed {
        path: spec.destination.clone(),
        mode: actual.to_string(),
    }));
    tracing::info!(path = %spec.destination.display(), mode = %actual, "artifact installed");

    Ok(ArtifactReport {
        path: spec.destination.clone(),
        mode: actual,
        size,
        blake3: hash.to_hex(),
    })
}
