//! Configuration sections as they appear in the TOML file

use crate::constants;
use polyenv_types::{
    ColorChoice, FileMode, OutputFormat, PackageTemplate, RuntimeVersion, VersionRule,
};
use polyenv_hash::Hash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Identity of the image being provisioned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseConfig {
    #[serde(default = "default_base_image")]
    pub image: String,
}

/// Third-party package source providing the interpreters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_id")]
    pub id: String,
}

/// Interpreter versions and the system packages each one needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimesConfig {
    #[serde(default = "default_versions")]
    pub versions: Vec<String>,
    #[serde(default = "default_runtime_packages")]
    pub packages: Vec<PackageTemplate>,
    #[serde(default = "default_rules")]
    pub rules: Vec<VersionRule>,
}

/// Per-runtime package manager bootstrap and test dependencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependenciesConfig {
    #[serde(default = "default_dependency_packages")]
    pub packages: Vec<String>,
    #[serde(default = "default_bootstrap_url")]
    pub bootstrap_url: String,
    #[serde(default)]
    pub bootstrap_checksums: BTreeMap<RuntimeVersion, Hash>,
}

/// Prebuilt binary placed on the execution path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_artifact_destination")]
    pub destination: PathBuf,
    #[serde(default)]
    pub mode: FileMode,
    #[serde(default)]
    pub checksum: Option<Hash>,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    /// Total attempts for package operations, first try included
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    #[serde(default = "default_work_root")]
    pub work_root: PathBuf,
    #[serde(default = "default_search_path")]
    pub search_path: Vec<PathBuf>,
}

/// Entry point of the provisioned environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default = "default_shell")]
    pub program: PathBuf,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            color: default_color_choice(),
        }
    }
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            image: default_base_image(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            id: default_source_id(),
        }
    }
}

impl Default for RuntimesConfig {
    fn default() -> Self {
        Self {
            versions: default_versions(),
            packages: default_runtime_packages(),
            rules: default_rules(),
        }
    }
}

impl Default for DependenciesConfig {
    fn default() -> Self {
        Self {
            packages: default_dependency_packages(),
            bootstrap_url: default_bootstrap_url(),
            bootstrap_checksums: BTreeMap::new(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            url: None,
            destination: default_artifact_destination(),
            mode: FileMode::READ_EXECUTE_ALL,
            checksum: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retries: default_retries(),
            retry_delay: default_retry_delay(),
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            work_root: default_work_root(),
            search_path: default_search_path(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: default_shell(),
        }
    }
}

// Default value functions for serde
fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_base_image() -> String {
    "ubuntu:20.04".to_string()
}

fn default_source_id() -> String {
    "ppa:deadsnakes/ppa".to_string()
}

fn default_versions() -> Vec<String> {
    vec!["3.7".to_string(), "3.8".to_string(), "3.9".to_string()]
}

fn default_runtime_packages() -> Vec<PackageTemplate> {
    polyenv_types::VersionPolicyTable::default().base
}

fn default_rules() -> Vec<VersionRule> {
    polyenv_types::VersionPolicyTable::default().rules
}

fn default_dependency_packages() -> Vec<String> {
    vec![
        "pytest".to_string(),
        "setuptools".to_string(),
        "wheel".to_string(),
    ]
}

fn default_bootstrap_url() -> String {
    "https://bootstrap.pypa.io/get-pip.py".to_string()
}

fn default_artifact_destination() -> PathBuf {
    PathBuf::from("/usr/local/bin/tool")
}

fn default_timeout() -> u64 {
    300 // 5 minutes
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1 // 1 second
}

fn default_work_root() -> PathBuf {
    PathBuf::from(constants::WORK_ROOT)
}

fn default_search_path() -> Vec<PathBuf> {
    constants::SEARCH_PATH.iter().map(PathBuf::from).collect()
}

fn default_shell() -> PathBuf {
    PathBuf::from(constants::DEFAULT_SHELL)
}
