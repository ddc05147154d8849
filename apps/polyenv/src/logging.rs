//! Structured logging integration for events
//!
//! Mirrors every domain event into tracing with the event's metadata as
//! structured fields, so the debug log file holds the full run history.

use polyenv_events::{
    AppEvent, ArtifactEvent, DependencyEvent, EventMessage, GeneralEvent, PipelineEvent,
    PlatformEvent, RuntimeEvent, SourceEvent,
};
use tracing::{debug, error, info, trace, warn, Level};

/// One-line description of an event for log records
fn describe(event: &AppEvent) -> String {
    match event {
        AppEvent::General(event) => match event {
            GeneralEvent::Warning { message, .. }
            | GeneralEvent::Error { message, .. }
            | GeneralEvent::DebugLog { message, .. } => message.clone(),
            GeneralEvent::RetryScheduled {
                operation,
                attempt,
                max_attempts,
                error,
                ..
            } => format!("{operation}: attempt {attempt}/{max_attempts} failed: {error}"),
            GeneralEvent::RetriesExhausted {
                operation,
                attempts,
                error,
            } => format!("{operation}: gave up after {attempts} attempts: {error}"),
        },
        AppEvent::Pipeline(event) => match event {
            PipelineEvent::RunStarted { run_id, .. } => format!("run {run_id} started"),
            PipelineEvent::StageStarted { stage } => format!("stage {stage} started"),
            PipelineEvent::StageCompleted { stage, duration_ms } => {
                format!("stage {stage} completed in {duration_ms}ms")
            }
            PipelineEvent::StageFailed { stage, failure } => {
                format!("stage {stage} failed: {}", failure.message)
            }
            PipelineEvent::StageSkipped { stage } => format!("stage {stage} skipped"),
            PipelineEvent::RunCompleted { run_id, duration_ms } => {
                format!("run {run_id} completed in {duration_ms}ms")
            }
            PipelineEvent::RunFailed { run_id, failure } => {
                format!("run {run_id} failed: {}", failure.message)
            }
        },
        AppEvent::Source(event) => match event {
            SourceEvent::Registering { source_id } => format!("registering {source_id}"),
            SourceEvent::Registered { source_id } => format!("registered {source_id}"),
            SourceEvent::IndexRefreshing => "refreshing package index".to_string(),
            SourceEvent::IndexRefreshed => "package index refreshed".to_string(),
        },
        AppEvent::Runtime(event) => match event {
            RuntimeEvent::Installing { packages, .. } => {
                format!("installing {} runtime packages", packages.len())
            }
            RuntimeEvent::Installed { package_count } => {
                format!("installed {package_count} runtime packages")
            }
            RuntimeEvent::CleanedUp => "package caches cleaned".to_string(),
            RuntimeEvent::Probed { version, reported } => format!("python{version}: {reported}"),
        },
        AppEvent::Artifact(event) => match event {
            ArtifactEvent::Fetching { url } => format!("fetching {url}"),
            ArtifactEvent::Fetched { url, size } => format!("fetched {url} ({size} bytes)"),
            ArtifactEvent::FetchFailed { url, failure } => {
                format!("fetch of {url} failed: {}", failure.message)
            }
            ArtifactEvent::ChecksumVerified { blake3 } => format!("checksum verified ({blake3})"),
            ArtifactEvent::ChecksumSkipped { url } => format!("no checksum configured for {url}"),
            ArtifactEvent::Installed { path, mode } => {
                format!("installed {} with mode {mode}", path.display())
            }
        },
        AppEvent::Dependency(event) => match event {
            DependencyEvent::StateChanged { version, from, to } => {
                format!("runtime {version}: {from} -> {to}")
            }
            DependencyEvent::WorkdirPrepared { version, path } => {
                format!("runtime {version}: working directory {}", path.display())
            }
            DependencyEvent::BootstrapFetched {
                version, verified, ..
            } => format!("runtime {version}: bootstrap fetched (verified: {verified})"),
            DependencyEvent::Installing { version, packages } => {
                format!("runtime {version}: installing {} packages", packages.len())
            }
            DependencyEvent::WorkdirRemoved { version } => {
                format!("runtime {version}: working directory removed")
            }
            DependencyEvent::Failed { version, failure } => {
                format!("runtime {version} failed: {}", failure.message)
            }
        },
        AppEvent::Platform(event) => match event {
            PlatformEvent::ProcessStarted { command } => {
                format!("exec {} {}", command.program, command.args.join(" "))
            }
            PlatformEvent::ProcessCompleted {
                command,
                exit_code,
                duration_ms,
                ..
            } => format!(
                "{} exited with {exit_code:?} after {duration_ms}ms",
                command.program
            ),
            PlatformEvent::ProcessFailed {
                command, failure, ..
            } => format!("{} failed: {}", command.program, failure.message),
            PlatformEvent::FileWritten { path, bytes, mode } => {
                format!("wrote {} ({bytes} bytes, mode {mode:o})", path.display())
            }
        },
    }
}

/// Log an event using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let text = describe(&message.event);

    macro_rules! emit {
        ($macro:ident) => {
            $macro!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                correlation = ?meta.correlation_id,
                "{text}"
            )
        };
    }

    match meta.tracing_level() {
        Level::ERROR => emit!(error),
        Level::WARN => emit!(warn),
        Level::INFO => emit!(info),
        Level::DEBUG => emit!(debug),
        _ => emit!(trace),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polyenv_types::Stage;

    #[test]
    fn test_describe_stage_events() {
        let text = describe(&AppEvent::Pipeline(PipelineEvent::StageCompleted {
            stage: Stage::FetchArtifact,
            duration_ms: 12,
        }));
        assert_eq!(text, "stage fetch-artifact completed in 12ms");
    }

    #[test]
    fn test_logging_without_subscriber_is_noop() {
        let message = EventMessage::from_event(AppEvent::Source(SourceEvent::IndexRefreshed));
        log_event_with_tracing(&message);
    }
}
