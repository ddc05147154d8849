//! Provisioning run orchestration

use polyenv_config::ProvisionParams;
use polyenv_errors::Error;
use polyenv_events::{AppEvent, EventEmitter, FailureContext, PipelineEvent};
use polyenv_types::{ProvisionPlan, ProvisionReport, RuntimeReport, RuntimeState, Stage, StageReport};
use std::future::Future;
use std::time::Instant;

use crate::{
    fetch_artifact, install_dependencies, install_runtimes, register_source, verify_runtimes,
    OpsCtx,
};

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

async fn run_stage<T, Fut>(
    ctx: &OpsCtx,
    stages: &mut Vec<StageReport>,
    stage: Stage,
    fut: Fut,
) -> Result<T, Error>
where
    Fut: Future<Output = Result<T, Error>>,
{
    let start = Instant::now();
    ctx.emit_stage_started(stage);
    tracing::info!(stage = %stage, "stage started");

    match fut.await {
        Ok(value) => {
            let duration_ms = elapsed_ms(start);
            ctx.emit_stage_completed(stage, duration_ms);
            stages.push(StageReport { stage, duration_ms });
            Ok(value)
        }
        Err(err) => {
            ctx.emit_stage_failed(stage, &err);
            tracing::error!(stage = %stage, error = %err, "stage failed");
            Err(err)
        }
    }
}

/// Run every stage in order and report the provisioned environment
///
/// Stages run strictly one after another. The first failure ends the run:
/// later stages are reported as skipped and never execute.
///
/// # Errors
///
/// Returns the error of the stage that failed.
pub async fn provision(ctx: &OpsCtx) -> Result<ProvisionReport, Error> {
    let start = Instant::now();
    ctx.emit(AppEvent::Pipeline(PipelineEvent::RunStarted {
        run_id: ctx.run_id,
        base_image: ctx.params.base_image.clone(),
        runtimes: ctx.params.versions.as_slice().to_vec(),
    }));

    let mut stages = Vec::with_capacity(Stage::ALL.len());
    let outcome = async {
        run_stage(ctx, &mut stages, Stage::RegisterSource, register_source(ctx)).await?;
        run_stage(ctx, &mut stages, Stage::InstallRuntimes, install_runtimes(ctx)).await?;
        let artifact = run_stage(ctx, &mut stages, Stage::FetchArtifact, fetch_artifact(ctx)).await?;
        let progress = run_stage(
            ctx,
            &mut stages,
            Stage::InstallDependencies,
            install_dependencies(ctx),
        )
        .await?;
        let probes = run_stage(ctx, &mut stages, Stage::VerifyRuntimes, verify_runtimes(ctx)).await?;
        Ok::<_, Error>((artifact, progress, probes))
    }
    .await;

    let (artifact, progress, probes) = match outcome {
        Ok(done) => done,
        Err(err) => {
            // The stage after the last completed one is the one that failed.
            for &stage in Stage::ALL.iter().skip(stages.len() + 1) {
                ctx.emit(AppEvent::Pipeline(PipelineEvent::StageSkipped { stage }));
            }
            ctx.emit(AppEvent::Pipeline(PipelineEvent::RunFailed {
                run_id: ctx.run_id,
                failure: FailureContext::from_error(&err),
            }));
            return Err(err);
        }
    };

    let runtimes = ctx
        .params
        .plan
        .entries
        .iter()
        .map(|entry| RuntimeReport {
            version: entry.version,
            state: progress
                .iter()
                .find(|p| p.version == entry.version)
                .map_or(RuntimeState::Pending, |p| p.state),
            packages: entry.packages.clone(),
            interpreter: probes
                .iter()
                .find(|(version, _)| *version == entry.version)
                .map(|(_, reported)| reported.clone()),
        })
        .collect();

    let duration_ms = elapsed_ms(start);
    ctx.emit(AppEvent::Pipeline(PipelineEvent::RunCompleted {
        run_id: ctx.run_id,
        duration_ms,
    }));

    Ok(ProvisionReport {
        run_id: ctx.run_id,
        base_image: ctx.params.base_image.clone(),
        stages,
        runtimes,
        artifact,
        duration_ms,
    })
}

/// Describe what `provision` would do with these parameters
#[must_use]
pub fn plan(params: &ProvisionParams) -> ProvisionPlan {
    ProvisionPlan {
        base_image: params.base_image.clone(),
        source: params.source_id.clone(),
        runtimes: params.plan.clone(),
        system_packages: params.plan.all_packages(),
        artifact_url: params.artifact.url.clone(),
        artifact_path: params.artifact.destination.clone(),
        artifact_mode: params.artifact.mode,
        bootstrap_url: params.bootstrap.url.clone(),
        dependencies: params.packages.as_slice().to_vec(),
        max_attempts: params.retry.max_attempts,
    }
}
