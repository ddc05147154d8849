#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for polyenv
//!
//! This crate sits between the CLI and the host capabilities. It runs the
//! provisioning stages in order: source registration, runtime install,
//! artifact fetch, per-runtime dependency install, and a final interpreter
//! probe. The first failing stage fails the run and nothing after it starts.

mod artifact;
mod context;
mod dependencies;
mod pipeline;
mod registrar;
mod retry;
mod runtime;
mod verify;

pub use artifact::fetch_artifact;
pub use context::{OpsContextBuilder, OpsCtx};
pub use dependencies::install_dependencies;
pub use pipeline::{plan, provision};
pub use registrar::register_source;
pub use retry::with_retry;
pub use runtime::install_runtimes;
pub use verify::verify_runtimes;

use polyenv_errors::Error;
use polyenv_types::{ProvisionPlan, ProvisionReport};

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Completed provisioning run
    ProvisionReport(ProvisionReport),
    /// Dry-run plan
    ProvisionPlan(ProvisionPlan),
    /// Generic success message
    Success(String),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::from)
    }
}
