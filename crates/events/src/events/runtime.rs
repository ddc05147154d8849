use serde::{Deserialize, Serialize};

use polyenv_types::{PackageName, RuntimeVersion};

/// Interpreter installation through the system package manager
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    Installing {
        runtimes: Vec<RuntimeVersion>,
        packages: Vec<PackageName>,
    },
    Installed {
        package_count: usize,
    },
    CleanedUp,
    /// Interpreter answered its version probe
    Probed {
        version: RuntimeVersion,
        reported: String,
    },
}
