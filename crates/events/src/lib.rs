#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in polyenv
//!
//! Pipeline stages never print or log directly. They emit domain events over
//! an unbounded channel and the CLI decides how to render or log them.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{
    AppEvent, ArtifactEvent, DependencyEvent, FailureContext, GeneralEvent, PipelineEvent,
    PlatformEvent, ProcessCommandDescriptor, RuntimeEvent, SourceEvent,
};

use polyenv_errors::UserFacingError;
use polyenv_types::{RuntimeState, RuntimeVersion, Stage};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event together with its emission metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from its domain and severity
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let meta = EventMeta::new(event.level(), event.source());
        Self { meta, event }
    }
}

/// Type alias for event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout polyenv
///
/// Works the same whether you hold a raw `EventSender` or a struct that
/// contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Correlation id stamped on every emitted event, if any
    fn correlation_id(&self) -> Option<String> {
        None
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            let mut message = EventMessage::from_event(event);
            if let Some(id) = self.correlation_id() {
                message.meta = message.meta.with_correlation_id(id);
            }
            // Receiver may be gone during shutdown
            let _ = sender.send(message);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an error event
    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message)));
    }

    fn emit_stage_started(&self, stage: Stage) {
        self.emit(AppEvent::Pipeline(PipelineEvent::StageStarted { stage }));
    }

    fn emit_stage_completed(&self, stage: Stage, duration_ms: u64) {
        self.emit(AppEvent::Pipeline(PipelineEvent::StageCompleted {
            stage,
            duration_ms,
        }));
    }

    fn emit_stage_failed<E: UserFacingError + ?Sized>(&self, stage: Stage, error: &E) {
        self.emit(AppEvent::Pipeline(PipelineEvent::StageFailed {
            stage,
            failure: FailureContext::from_error(error),
        }));
    }

    /// Emit a runtime state machine transition
    fn emit_state_changed(&self, version: RuntimeVersion, from: RuntimeState, to: RuntimeState) {
        self.emit(AppEvent::Dependency(DependencyEvent::StateChanged {
            version,
            from,
            to,
        }));
    }
}

/// Implementation of `EventEmitter` for the raw `EventSender`
impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
