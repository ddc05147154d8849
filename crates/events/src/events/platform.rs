//! Platform operation events

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessCommandDescriptor {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

/// Process and filesystem operations performed on the host
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// Process execution started
    ProcessStarted { command: ProcessCommandDescriptor },

    /// Process exited (successfully or not)
    ProcessCompleted {
        command: ProcessCommandDescriptor,
        exit_code: Option<i32>,
        duration_ms: u64,
        stdout_bytes: u64,
        stderr_bytes: u64,
    },

    /// Process could not be spawned
    ProcessFailed {
        command: ProcessCommandDescriptor,
        failure: FailureContext,
        duration_ms: u64,
    },

    /// File written with an explicit mode
    FileWritten {
        path: PathBuf,
        bytes: u64,
        mode: u32,
    },
}
