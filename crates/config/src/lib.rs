#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for polyenv
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/polyenv/config.toml)
//! - Environment variables
//! - CLI flags
//!
//! The merged [`Config`] is then validated once into [`ProvisionParams`], the
//! immutable build-time parameters of a provisioning run.

pub mod constants;
mod params;
mod sections;

pub use params::ProvisionParams;
pub use sections::{
    ArtifactConfig, BaseConfig, DependenciesConfig, GeneralConfig, NetworkConfig, PathConfig,
    RuntimesConfig, ShellConfig, SourceConfig,
};

use polyenv_errors::{ConfigError, Error};
use polyenv_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub base: BaseConfig,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub runtimes: RuntimesConfig,

    #[serde(default)]
    pub dependencies: DependenciesConfig,

    #[serde(default)]
    pub artifact: ArtifactConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub paths: PathConfig,

    #[serde(default)]
    pub shell: ShellConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::CONFIG_DIR_NAME)
            .join(constants::CONFIG_FILE_NAME))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::parse(&contents)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            tracing::debug!(path = %config_path.display(), "loading configuration");
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // POLYENV_OUTPUT
        if let Ok(output) = std::env::var("POLYENV_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "POLYENV_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // POLYENV_COLOR
        if let Ok(color) = std::env::var("POLYENV_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "POLYENV_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // POLYENV_RUNTIMES=3.8,3.9
        if let Ok(runtimes) = std::env::var("POLYENV_RUNTIMES") {
            self.runtimes.versions = runtimes
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(String::from)
                .collect();
        }

        // POLYENV_RETRIES
        if let Ok(retries) = std::env::var("POLYENV_RETRIES") {
            self.network.retries = retries.parse().map_err(|_| ConfigError::InvalidValue {
                field: "POLYENV_RETRIES".to_string(),
                value: retries,
            })?;
        }

        if let Ok(source) = std::env::var("POLYENV_SOURCE") {
            self.source.id = source;
        }

        if let Ok(url) = std::env::var("POLYENV_ARTIFACT_URL") {
            self.artifact.url = Some(url);
        }

        if let Ok(root) = std::env::var("POLYENV_WORK_ROOT") {
            self.paths.work_root = PathBuf::from(root);
        }

        Ok(())
    }

    /// Validate into the immutable parameters of a provisioning run
    ///
    /// # Errors
    ///
    /// Returns the first configuration value that violates an invariant.
    pub fn provision_params(&self) -> Result<ProvisionParams, Error> {
        ProvisionParams::from_config(self).map_err(Into::into)
    }
}
