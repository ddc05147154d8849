use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FailureContext;
use polyenv_types::{RuntimeVersion, Stage};

/// Lifecycle of a provisioning run and its stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted {
        run_id: Uuid,
        base_image: String,
        runtimes: Vec<RuntimeVersion>,
    },
    StageStarted {
        stage: Stage,
    },
    StageCompleted {
        stage: Stage,
        duration_ms: u64,
    },
    StageFailed {
        stage: Stage,
        failure: FailureContext,
    },
    /// Stages after a failure are never started
    StageSkipped {
        stage: Stage,
    },
    RunCompleted {
        run_id: Uuid,
        duration_ms: u64,
    },
    RunFailed {
        run_id: Uuid,
        failure: FailureContext,
    },
}
