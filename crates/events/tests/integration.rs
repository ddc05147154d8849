//! Integration tests for the event channel

use polyenv_errors::{Error, InstallError};
use polyenv_events::*;
use polyenv_types::{RuntimeState, RuntimeVersion, Stage};

#[tokio::test]
async fn test_emit_wraps_event_with_meta() {
    let (tx, mut rx) = channel();
    tx.emit_stage_started(Stage::RegisterSource);

    let message = rx.recv().await.unwrap();
    assert_eq!(message.meta.source, EventSource::PIPELINE);
    assert_eq!(message.meta.level, EventLevel::Info);
    assert!(matches!(
        message.event,
        AppEvent::Pipeline(PipelineEvent::StageStarted {
            stage: Stage::RegisterSource
        })
    ));
}

#[tokio::test]
async fn test_emit_after_receiver_dropped_is_silent() {
    let (tx, rx) = channel();
    drop(rx);
    tx.emit_warning("nobody is listening");
}

#[tokio::test]
async fn test_stage_failure_carries_failure_context() {
    let (tx, mut rx) = channel();
    let err: Error = InstallError::PackageNotFound {
        package: "python3.7-distutils".to_string(),
    }
    .into();
    tx.emit_stage_failed(Stage::InstallRuntimes, &err);

    let message = rx.recv().await.unwrap();
    assert_eq!(message.meta.level, EventLevel::Error);
    match message.event {
        AppEvent::Pipeline(PipelineEvent::StageFailed { stage, failure }) => {
            assert_eq!(stage, Stage::InstallRuntimes);
            assert!(failure.message.contains("python3.7-distutils"));
            assert!(!failure.retryable);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

struct Correlated {
    sender: EventSender,
}

impl EventEmitter for Correlated {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.sender)
    }

    fn correlation_id(&self) -> Option<String> {
        Some("run-42".to_string())
    }
}

#[tokio::test]
async fn test_correlation_id_is_stamped() {
    let (tx, mut rx) = channel();
    let emitter = Correlated { sender: tx };
    emitter.emit_state_changed(
        RuntimeVersion::new(3, 8),
        RuntimeState::Pending,
        RuntimeState::Bootstrapped,
    );

    let message = rx.recv().await.unwrap();
    assert_eq!(message.meta.correlation_id.as_deref(), Some("run-42"));
    assert_eq!(message.meta.source, EventSource::DEPENDENCY);
}

#[test]
fn test_event_serializes_with_domain_tag() {
    let event = AppEvent::Source(SourceEvent::Registered {
        source_id: "ppa:deadsnakes/ppa".to_string(),
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["domain"], "source");
    assert_eq!(json["event"]["type"], "registered");
}

#[test]
fn test_retry_scheduled_is_warning() {
    let event = AppEvent::General(GeneralEvent::RetryScheduled {
        operation: "apt-get update".to_string(),
        attempt: 1,
        max_attempts: 3,
        delay_ms: 1000,
        error: "temporary failure".to_string(),
    });
    assert_eq!(event.level(), EventLevel::Warn);
}
