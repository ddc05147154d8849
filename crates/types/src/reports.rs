//! Report type definitions for provisioning runs

use crate::artifact::FileMode;
use crate::package::PackageName;
use crate::policy::RuntimePlan;
use crate::state::{RuntimeState, Stage};
use crate::version::RuntimeVersion;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Outcome of a completed provisioning run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvisionReport {
    pub run_id: Uuid,
    pub base_image: String,
    pub stages: Vec<StageReport>,
    pub runtimes: Vec<RuntimeReport>,
    pub artifact: ArtifactReport,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: Stage,
    pub duration_ms: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuntimeReport {
    pub version: RuntimeVersion,
    pub state: RuntimeState,
    pub packages: Vec<PackageName>,
    /// Output of the interpreter's `--version` probe
    pub interpreter: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactReport {
    pub path: PathBuf,
    pub mode: FileMode,
    pub size: u64,
    pub blake3: String,
}

/// What a run would do, without doing it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProvisionPlan {
    pub base_image: String,
    pub source: String,
    pub runtimes: RuntimePlan,
    pub system_packages: Vec<PackageName>,
    pub artifact_url: String,
    pub artifact_path: PathBuf,
    pub artifact_mode: FileMode,
    pub bootstrap_url: String,
    pub dependencies: Vec<PackageName>,
    pub max_attempts: u32,
}
