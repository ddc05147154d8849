//! Pipeline stages and per-runtime provisioning state

use crate::version::RuntimeVersion;
use polyenv_errors::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ordered stages of a provisioning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    RegisterSource,
    InstallRuntimes,
    FetchArtifact,
    InstallDependencies,
    VerifyRuntimes,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::RegisterSource,
        Stage::InstallRuntimes,
        Stage::FetchArtifact,
        Stage::InstallDependencies,
        Stage::VerifyRuntimes,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegisterSource => "register-source",
            Self::InstallRuntimes => "install-runtimes",
            Self::FetchArtifact => "fetch-artifact",
            Self::InstallDependencies => "install-dependencies",
            Self::VerifyRuntimes => "verify-runtimes",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dependency-install state of one runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeState {
    Pending,
    Bootstrapped,
    DependenciesInstalled,
    Failed,
}

impl RuntimeState {
    #[must_use]
    pub fn can_transition_to(self, next: RuntimeState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Bootstrapped | Self::Failed)
                | (Self::Bootstrapped, Self::DependenciesInstalled | Self::Failed)
        )
    }
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Bootstrapped => "bootstrapped",
            Self::DependenciesInstalled => "dependencies-installed",
            Self::Failed => "failed",
        })
    }
}

/// Tracks one runtime through `pending -> bootstrapped -> dependencies-installed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeProgress {
    pub version: RuntimeVersion,
    pub state: RuntimeState,
}

impl RuntimeProgress {
    #[must_use]
    pub fn new(version: RuntimeVersion) -> Self {
        Self {
            version,
            state: RuntimeState::Pending,
        }
    }

    /// # Errors
    ///
    /// Returns an internal error on a transition the state machine forbids.
    pub fn transition(&mut self, next: RuntimeState) -> Result<(), Error> {
        if !self.state.can_transition_to(next) {
            return Err(Error::internal(format!(
                "runtime {}: invalid transition {} -> {}",
                self.version, self.state, next
            )));
        }
        self.state = next;
        Ok(())
    }
}
