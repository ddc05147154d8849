//! Integration tests for config

#[cfg(test)]
mod tests {
    use polyenv_config::*;
    use polyenv_types::{ColorChoice, FileMode, OutputFormat, RuntimeVersion};
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_VARS: [&str; 7] = [
        "POLYENV_OUTPUT",
        "POLYENV_COLOR",
        "POLYENV_RUNTIMES",
        "POLYENV_RETRIES",
        "POLYENV_SOURCE",
        "POLYENV_ARTIFACT_URL",
        "POLYENV_WORK_ROOT",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "plain"
color = "never"

[base]
image = "ubuntu:22.04"

[runtimes]
versions = ["3.8", "3.10", "3.11"]
packages = ["python{{version}}", "python{{version}}-dev"]

[[runtimes.rules]]
min_version = "3.10"
packages = ["python{{version}}-venv"]

[dependencies]
packages = ["pytest==7.4.0", "hypothesis"]

[artifact]
url = "https://example.com/releases/tool-linux-amd64"
destination = "/usr/local/bin/tool"
mode = "0555"

[network]
retries = 5
retry_delay = 0
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.base.image, "ubuntu:22.04");

        let params = config.provision_params().unwrap();
        assert_eq!(params.retry.max_attempts, 5);
        assert_eq!(params.artifact.mode, FileMode::READ_EXECUTE_ALL);
        assert_eq!(params.packages.len(), 2);

        let v38 = &params.plan.entries[0];
        assert_eq!(v38.version, RuntimeVersion::new(3, 8));
        assert_eq!(v38.packages.len(), 2);
        let v311 = &params.plan.entries[2];
        assert_eq!(v311.packages[2].as_str(), "python3.11-venv");
    }

    #[tokio::test]
    async fn test_missing_file_reports_not_found() {
        let err = Config::load_from_file(std::path::Path::new("/nonexistent/polyenv.toml"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            polyenv_errors::Error::Config(polyenv_errors::ConfigError::NotFound { .. })
        ));
    }

    #[test]
    fn test_writable_artifact_mode_rejected() {
        let config = Config::parse(
            r#"
[artifact]
url = "https://example.com/tool"
mode = "0777"
"#,
        )
        .unwrap();
        assert!(config.provision_params().is_err());
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("POLYENV_OUTPUT", "json");
        std::env::set_var("POLYENV_COLOR", "always");
        std::env::set_var("POLYENV_RUNTIMES", "3.10, 3.11");
        std::env::set_var("POLYENV_RETRIES", "4");
        std::env::set_var("POLYENV_ARTIFACT_URL", "https://example.com/tool");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.general.color, ColorChoice::Always);
        assert_eq!(config.runtimes.versions, ["3.10", "3.11"]);
        assert_eq!(config.network.retries, 4);
        assert!(config.provision_params().is_ok());

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("POLYENV_RETRIES", "many");

        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }
}
