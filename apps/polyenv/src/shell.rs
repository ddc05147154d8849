//! Default entry point of the provisioned environment

use polyenv_config::Config;
use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::process::Command;

use crate::error::CliError;

/// PATH with the configured search directories first, then the inherited one
fn search_path(config: &Config) -> Result<OsString, CliError> {
    let inherited = std::env::var_os("PATH").unwrap_or_default();
    let dirs = config
        .paths
        .search_path
        .iter()
        .cloned()
        .chain(std::env::split_paths(&inherited))
        .fold(Vec::new(), |mut acc, dir| {
            if !acc.contains(&dir) {
                acc.push(dir);
            }
            acc
        });
    std::env::join_paths(dirs).map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Replace this process with an interactive shell
///
/// Only returns when the shell could not be executed.
pub fn enter(config: &Config) -> CliError {
    let program = &config.shell.program;
    let path = match search_path(config) {
        Ok(path) => path,
        Err(e) => return e,
    };
    tracing::info!(shell = %program.display(), "entering shell");

    let source = Command::new(program).env("PATH", path).exec();
    CliError::Shell {
        program: program.clone(),
        source,
    }
}
