//! Command line interface definition

use clap::{Parser, Subcommand};
use polyenv_types::ColorChoice;
use std::path::PathBuf;

/// polyenv - Multi-interpreter test environment provisioner
#[derive(Parser)]
#[command(name = "polyenv")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-interpreter test environment provisioner")]
#[command(long_about = None)]
pub struct Cli {
    /// Defaults to `shell` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to /var/log/polyenv/
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Open an interactive shell in the provisioned environment
    Shell,

    /// Provision interpreters, the artifact and test dependencies
    Provision {
        /// Print the resolved plan without executing anything
        #[arg(long)]
        dry_run: bool,

        /// Interpreter versions to provision (overrides config)
        #[arg(long = "runtime", value_name = "VERSION", value_delimiter = ',')]
        runtimes: Vec<String>,

        /// Total attempts for package operations (overrides config)
        #[arg(long, value_name = "N")]
        retries: Option<u32>,

        /// URL of the prebuilt artifact (overrides config)
        #[arg(long, value_name = "URL")]
        artifact_url: Option<String>,
    },
}
