//! Validated build-time parameters

use crate::Config;
use polyenv_errors::ConfigError;
use polyenv_types::{
    ArtifactSpec, BootstrapSpec, PackageList, RetryPolicy, RuntimePlan, RuntimeVersionSet,
    VersionPolicyTable,
};
use std::path::PathBuf;
use std::time::Duration;

const MAX_RETRY_DELAY_SECS: u64 = 3600;

/// Everything a provisioning run needs, checked and frozen at start
#[derive(Debug, Clone)]
pub struct ProvisionParams {
    pub base_image: String,
    pub source_id: String,
    pub versions: RuntimeVersionSet,
    /// The policy table evaluated against `versions`
    pub plan: RuntimePlan,
    pub packages: PackageList,
    pub bootstrap: BootstrapSpec,
    pub artifact: ArtifactSpec,
    pub retry: RetryPolicy,
    pub work_root: PathBuf,
}

impl ProvisionParams {
    pub(crate) fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let source_id = config.source.id.trim();
        if source_id.is_empty() {
            return Err(ConfigError::MissingField {
                field: "source.id".to_string(),
            });
        }

        let versions = RuntimeVersionSet::parse(&config.runtimes.versions)?;
        let policy = VersionPolicyTable {
            base: config.runtimes.packages.clone(),
            rules: config.runtimes.rules.clone(),
        };
        let plan = policy.resolve(&versions)?;

        let packages = PackageList::parse(&config.dependencies.packages)?;

        if config.dependencies.bootstrap_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "dependencies.bootstrap_url".to_string(),
            });
        }
        if let Some(stray) = config
            .dependencies
            .bootstrap_checksums
            .keys()
            .find(|v| !versions.contains(v))
        {
            return Err(ConfigError::InvalidValue {
                field: "dependencies.bootstrap_checksums".to_string(),
                value: format!("{stray} is not a configured runtime"),
            });
        }
        let bootstrap = BootstrapSpec {
            url: config.dependencies.bootstrap_url.clone(),
            checksums: config.dependencies.bootstrap_checksums.clone(),
        };

        let url = config
            .artifact
            .url
            .clone()
            .ok_or_else(|| ConfigError::MissingField {
                field: "artifact.url".to_string(),
            })?;
        let artifact = ArtifactSpec {
            url,
            destination: config.artifact.destination.clone(),
            mode: config.artifact.mode,
            checksum: config.artifact.checksum.clone(),
        };
        artifact.validate(&config.paths.search_path)?;

        if config.network.retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "network.retries".to_string(),
                value: "0".to_string(),
            });
        }
        if config.network.retry_delay > MAX_RETRY_DELAY_SECS {
            return Err(ConfigError::InvalidValue {
                field: "network.retry_delay".to_string(),
                value: config.network.retry_delay.to_string(),
            });
        }
        let retry = RetryPolicy::new(
            config.network.retries,
            Duration::from_secs(config.network.retry_delay),
        );

        if !config.paths.work_root.is_absolute() {
            return Err(ConfigError::InvalidValue {
                field: "paths.work_root".to_string(),
                value: config.paths.work_root.display().to_string(),
            });
        }

        Ok(Self {
            base_image: config.base.image.clone(),
            source_id: source_id.to_string(),
            versions,
            plan,
            packages,
            bootstrap,
            artifact,
            retry,
            work_root: config.paths.work_root.clone(),
        })
    }
}
