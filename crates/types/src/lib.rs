#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for polyenv
//!
//! Build-time parameters of a provisioning run. All of them are validated on
//! construction and immutable afterwards.

pub mod artifact;
pub mod bootstrap;
pub mod package;
pub mod policy;
pub mod reports;
pub mod retry;
pub mod state;
pub mod version;

// Re-export commonly used types
pub use artifact::{ArtifactSpec, FileMode};
pub use bootstrap::BootstrapSpec;
pub use package::{PackageList, PackageName};
pub use policy::{PackageTemplate, RuntimePackages, RuntimePlan, VersionPolicyTable, VersionRule};
pub use reports::{ArtifactReport, ProvisionPlan, ProvisionReport, RuntimeReport, StageReport};
pub use retry::RetryPolicy;
pub use state::{RuntimeProgress, RuntimeState, Stage};
pub use uuid::Uuid;
pub use version::{RuntimeVersion, RuntimeVersionSet};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    #[default]
    Tty,
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    Always,
    #[default]
    Auto,
    Never,
}

// Implement clap::ValueEnum for ColorChoice
impl clap::ValueEnum for ColorChoice {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Always, Self::Auto, Self::Never]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Always => clap::builder::PossibleValue::new("always"),
            Self::Auto => clap::builder::PossibleValue::new("auto"),
            Self::Never => clap::builder::PossibleValue::new("never"),
        })
    }
}
