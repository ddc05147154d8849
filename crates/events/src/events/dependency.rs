use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;
use polyenv_types::{PackageName, RuntimeState, RuntimeVersion};

/// Per-runtime package manager bootstrap and dependency install
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DependencyEvent {
    StateChanged {
        version: RuntimeVersion,
        from: RuntimeState,
        to: RuntimeState,
    },
    WorkdirPrepared {
        version: RuntimeVersion,
        path: PathBuf,
    },
    BootstrapFetched {
        version: RuntimeVersion,
        url: String,
        verified: bool,
    },
    Installing {
        version: RuntimeVersion,
        packages: Vec<PackageName>,
    },
    WorkdirRemoved {
        version: RuntimeVersion,
    },
    Failed {
        version: RuntimeVersion,
        failure: FailureContext,
    },
}
