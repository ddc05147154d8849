use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Single-attempt artifact fetch and placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArtifactEvent {
    Fetching {
        url: String,
    },
    Fetched {
        url: String,
        size: u64,
    },
    FetchFailed {
        url: String,
        failure: FailureContext,
    },
    ChecksumVerified {
        blake3: String,
    },
    /// No checksum configured; content accepted as served
    ChecksumSkipped {
        url: String,
    },
    Installed {
        path: PathBuf,
        mode: String,
    },
}
