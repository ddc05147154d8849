//! Fixed paths and defaults that are not exposed through TOML

pub const CONFIG_DIR_NAME: &str = "polyenv";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const LOGS_DIR: &str = "/var/log/polyenv";
pub const WORK_ROOT: &str = "/var/tmp/polyenv";

/// Search path of the provisioned environment
pub const SEARCH_PATH: [&str; 6] = [
    "/usr/local/sbin",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/bin",
    "/sbin",
    "/bin",
];

pub const DEFAULT_SHELL: &str = "/bin/bash";
