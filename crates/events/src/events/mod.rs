use serde::{Deserialize, Serialize};

use crate::{EventLevel, EventSource};
use polyenv_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code when the error carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod artifact;
pub mod dependency;
pub mod general;
pub mod pipeline;
pub mod platform;
pub mod runtime;
pub mod source;

pub use artifact::*;
pub use dependency::*;
pub use general::*;
pub use pipeline::*;
pub use platform::*;
pub use runtime::*;
pub use source::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, retries)
    General(GeneralEvent),

    /// Provisioning run and stage lifecycle
    Pipeline(PipelineEvent),

    /// Trusted package source registration
    Source(SourceEvent),

    /// Interpreter installation
    Runtime(RuntimeEvent),

    /// Prebuilt artifact placement
    Artifact(ArtifactEvent),

    /// Per-runtime dependency installation
    Dependency(DependencyEvent),

    /// Host process and filesystem operations
    Platform(PlatformEvent),
}

impl AppEvent {
    /// Severity used when the event is logged
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            AppEvent::General(GeneralEvent::Warning { .. }) => EventLevel::Warn,
            AppEvent::General(GeneralEvent::Error { .. } | GeneralEvent::RetriesExhausted { .. })
            | AppEvent::Pipeline(PipelineEvent::StageFailed { .. } | PipelineEvent::RunFailed { .. })
            | AppEvent::Artifact(ArtifactEvent::FetchFailed { .. })
            | AppEvent::Dependency(DependencyEvent::Failed { .. })
            | AppEvent::Platform(PlatformEvent::ProcessFailed { .. }) => EventLevel::Error,
            AppEvent::General(GeneralEvent::RetryScheduled { .. })
            | AppEvent::Artifact(ArtifactEvent::ChecksumSkipped { .. }) => EventLevel::Warn,
            AppEvent::General(GeneralEvent::DebugLog { .. })
            | AppEvent::Platform(_)
            | AppEvent::Dependency(
                DependencyEvent::WorkdirPrepared { .. } | DependencyEvent::WorkdirRemoved { .. },
            ) => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }

    /// Subsystem the event belongs to
    #[must_use]
    pub fn source(&self) -> EventSource {
        match self {
            AppEvent::General(_) => EventSource::GENERAL,
            AppEvent::Pipeline(_) => EventSource::PIPELINE,
            AppEvent::Source(_) => EventSource::SOURCE,
            AppEvent::Runtime(_) => EventSource::RUNTIME,
            AppEvent::Artifact(_) => EventSource::ARTIFACT,
            AppEvent::Dependency(_) => EventSource::DEPENDENCY,
            AppEvent::Platform(_) => EventSource::PLATFORM,
        }
    }
}
