//! Integration tests for the provisioning pipeline, driven by in-memory fakes

use async_trait::async_trait;
use polyenv_config::{Config, ProvisionParams};
use polyenv_errors::{Error, InstallError, NetworkError, PermissionError, PlatformError, SourceError};
use polyenv_events::{AppEvent, DependencyEvent, EventReceiver, GeneralEvent, PipelineEvent};
use polyenv_net::Fetcher;
use polyenv_ops::*;
use polyenv_platform::{
    CommandOutput, FilesystemOperations, InterpreterOperations, PackageManager, Platform,
    PlatformCommand, PlatformContext, ProcessOperations,
};
use polyenv_types::{FileMode, PackageName, RuntimeState, RuntimeVersion, Stage};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

const ARTIFACT_URL: &str = "https://releases.example.com/tool-linux-amd64";
const BOOTSTRAP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";

type ErrorFactory = fn() -> Error;

/// A scripted host: records every capability call and fails on demand
#[derive(Default)]
struct HostState {
    log: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, (u32, ErrorFactory)>>,
    /// Filesystem ops that fail once, after letting the given number of calls through
    fs_failures: Mutex<HashMap<String, u32>>,
    files: Mutex<BTreeMap<PathBuf, (Vec<u8>, FileMode)>>,
    forced_mode: Mutex<Option<FileMode>>,
}

#[derive(Clone, Default)]
struct FakeHost(Arc<HostState>);

impl FakeHost {
    fn record(&self, op: impl Into<String>) -> Result<(), Error> {
        let op = op.into();
        self.0.log.lock().unwrap().push(op.clone());
        let mut failures = self.0.failures.lock().unwrap();
        if let Some((remaining, make)) = failures.get_mut(&op) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(make());
            }
        }
        Ok(())
    }

    fn fail(&self, op: &str, times: u32, make: ErrorFactory) {
        self.0
            .failures
            .lock()
            .unwrap()
            .insert(op.to_string(), (times, make));
    }

    fn record_fs(&self, op: String) -> Result<(), PlatformError> {
        self.0.log.lock().unwrap().push(op.clone());
        let mut failures = self.0.fs_failures.lock().unwrap();
        let Some(skip) = failures.get_mut(&op) else {
            return Ok(());
        };
        if *skip > 0 {
            *skip -= 1;
            return Ok(());
        }
        failures.remove(&op);
        Err(PlatformError::FilesystemOperationFailed {
            operation: "remove_dir_all".to_string(),
            message: format!("{op}: Device or resource busy"),
        })
    }

    fn fail_fs_after(&self, op: &str, skip: u32) {
        self.0.fs_failures.lock().unwrap().insert(op.to_string(), skip);
    }

    fn force_mode(&self, mode: FileMode) {
        *self.0.forced_mode.lock().unwrap() = Some(mode);
    }

    fn log(&self) -> Vec<String> {
        self.0.log.lock().unwrap().clone()
    }

    fn count(&self, op: &str) -> usize {
        self.log().iter().filter(|entry| *entry == op).count()
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.log().iter().any(|entry| entry.starts_with(prefix))
    }

    fn platform(&self) -> Platform {
        Platform::new(
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
            Arc::new(self.clone()),
        )
    }
}

#[async_trait]
impl ProcessOperations for FakeHost {
    async fn execute_command(
        &self,
        _ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        Err(PlatformError::CommandNotFound {
            command: cmd.program().to_string(),
        }
        .into())
    }
}

#[async_trait]
impl PackageManager for FakeHost {
    async fn add_trusted_source(&self, _ctx: &PlatformContext, source_id: &str) -> Result<(), Error> {
        self.record(format!("add_trusted_source {source_id}"))
    }

    async fn refresh_index(&self, _ctx: &PlatformContext) -> Result<(), Error> {
        self.record("refresh_index")
    }

    async fn install(&self, _ctx: &PlatformContext, packages: &[PackageName]) -> Result<(), Error> {
        let names: Vec<&str> = packages.iter().map(PackageName::as_str).collect();
        self.record(format!("install {}", names.join(" ")))
    }

    async fn cleanup(&self, _ctx: &PlatformContext) -> Result<(), Error> {
        self.record("cleanup")
    }
}

#[async_trait]
impl FilesystemOperations for FakeHost {
    async fn write_file(
        &self,
        _ctx: &PlatformContext,
        path: &Path,
        bytes: &[u8],
        mode: FileMode,
    ) -> Result<(), PlatformError> {
        self.0.log.lock().unwrap().push(format!("write {}", path.display()));
        self.0
            .files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), (bytes.to_vec(), mode));
        Ok(())
    }

    async fn mode(&self, _ctx: &PlatformContext, path: &Path) -> Result<FileMode, PlatformError> {
        if let Some(mode) = *self.0.forced_mode.lock().unwrap() {
            return Ok(mode);
        }
        self.0
            .files
            .lock()
            .unwrap()
            .get(path)
            .map(|(_, mode)| *mode)
            .ok_or_else(|| PlatformError::FilesystemOperationFailed {
                operation: "metadata".to_string(),
                message: format!("{} not found", path.display()),
            })
    }

    async fn size(&self, _ctx: &PlatformContext, path: &Path) -> Result<u64, PlatformError> {
        Ok(self
            .0
            .files
            .lock()
            .unwrap()
            .get(path)
            .map_or(0, |(bytes, _)| bytes.len() as u64))
    }

    async fn create_dir_all(&self, _ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError> {
        self.0.log.lock().unwrap().push(format!("mkdir {}", path.display()));
        Ok(())
    }

    async fn remove_dir_all(&self, _ctx: &PlatformContext, path: &Path) -> Result<(), PlatformError> {
        self.record_fs(format!("rmdir {}", path.display()))?;
        self.0
            .files
            .lock()
            .unwrap()
            .retain(|file, _| !file.starts_with(path));
        Ok(())
    }

    async fn exists(&self, _ctx: &PlatformContext, path: &Path) -> bool {
        self.0.files.lock().unwrap().contains_key(path)
    }
}

#[async_trait]
impl InterpreterOperations for FakeHost {
    async fn run_script(
        &self,
        _ctx: &PlatformContext,
        version: RuntimeVersion,
        script: &Path,
        _workdir: &Path,
    ) -> Result<(), Error> {
        assert!(
            self.0.files.lock().unwrap().contains_key(script),
            "script executed before it was written"
        );
        self.record(format!("run_script {version}"))
    }

    async fn install_packages(
        &self,
        _ctx: &PlatformContext,
        version: RuntimeVersion,
        packages: &[PackageName],
        workdir: &Path,
    ) -> Result<(), Error> {
        assert!(workdir.ends_with(version.to_string()));
        let names: Vec<&str> = packages.iter().map(PackageName::as_str).collect();
        self.record(format!("install_packages {version} {}", names.join(" ")))
    }

    async fn probe(&self, _ctx: &PlatformContext, version: RuntimeVersion) -> Result<String, Error> {
        self.record(format!("probe {version}"))?;
        Ok(format!("Python {version}.0"))
    }
}

#[async_trait]
impl Fetcher for FakeHost {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, Error> {
        self.record(format!("fetch {url}"))?;
        Ok(format!("content of {url}").into_bytes())
    }
}

fn params_with(edit: impl FnOnce(&mut Config)) -> ProvisionParams {
    let mut config = Config::default();
    config.artifact.url = Some(ARTIFACT_URL.to_string());
    config.network.retry_delay = 0;
    edit(&mut config);
    config.provision_params().unwrap()
}

fn context(host: &FakeHost, params: ProvisionParams) -> (OpsCtx, EventReceiver) {
    let (tx, rx) = polyenv_events::channel();
    let ctx = OpsContextBuilder::new()
        .with_platform(host.platform())
        .with_fetcher(Arc::new(host.clone()))
        .with_params(params)
        .with_event_sender(tx)
        .build()
        .unwrap();
    (ctx, rx)
}

fn drain(rx: &mut EventReceiver) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(message) = rx.try_recv() {
        events.push(message.event);
    }
    events
}

#[tokio::test]
async fn test_successful_run_provisions_every_runtime() {
    let host = FakeHost::default();
    let (ctx, mut rx) = context(&host, params_with(|_| {}));

    let report = provision(&ctx).await.unwrap();

    assert_eq!(report.stages.len(), Stage::ALL.len());
    assert_eq!(report.runtimes.len(), 3);
    for runtime in &report.runtimes {
        assert_eq!(runtime.state, RuntimeState::DependenciesInstalled);
        assert_eq!(
            runtime.interpreter.as_deref(),
            Some(format!("Python {}.0", runtime.version).as_str())
        );
    }
    assert_eq!(report.artifact.mode, FileMode::READ_EXECUTE_ALL);
    assert_eq!(report.artifact.path, PathBuf::from("/usr/local/bin/tool"));

    // Each runtime bootstraps and installs the full list on its own
    for version in ["3.7", "3.8", "3.9"] {
        assert_eq!(host.count(&format!("run_script {version}")), 1);
        assert_eq!(
            host.count(&format!("install_packages {version} pytest setuptools wheel")),
            1
        );
    }

    // One transaction for all runtime packages; distutils only from 3.9
    let log = host.log();
    let install = log.iter().find(|op| op.starts_with("install python")).unwrap();
    assert!(install.contains("python3.7-dev"));
    assert!(install.contains("python3.9-distutils"));
    assert!(!install.contains("python3.8-distutils"));

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, AppEvent::Pipeline(PipelineEvent::RunCompleted { .. }))));
}

#[tokio::test]
async fn test_stages_run_in_order() {
    let host = FakeHost::default();
    let (ctx, _rx) = context(&host, params_with(|_| {}));
    provision(&ctx).await.unwrap();

    let log = host.log();
    let position = |prefix: &str| log.iter().position(|op| op.starts_with(prefix)).unwrap();
    assert!(position("add_trusted_source") < position("refresh_index"));
    assert!(position("refresh_index") < position("install python"));
    assert!(position("install python") < position("cleanup"));
    assert!(position("cleanup") < position(&format!("fetch {ARTIFACT_URL}")));
    assert!(position(&format!("fetch {ARTIFACT_URL}")) < position("run_script 3.7"));
    assert!(position("install_packages 3.7") < position("run_script 3.8"));
    assert!(position("install_packages 3.9") < position("probe 3.7"));
}

#[tokio::test]
async fn test_registrar_failure_stops_runtime_install() {
    let host = FakeHost::default();
    host.fail("add_trusted_source ppa:deadsnakes/ppa", 3, || {
        SourceError::SignatureRejected {
            source_id: "ppa:deadsnakes/ppa".to_string(),
            message: "NO_PUBKEY".to_string(),
        }
        .into()
    });
    let (ctx, mut rx) = context(&host, params_with(|_| {}));

    let err = provision(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Source(SourceError::SignatureRejected { .. })));
    assert_eq!(host.count("add_trusted_source ppa:deadsnakes/ppa"), 1);
    assert!(!host.has_prefix("install"));
    assert!(!host.has_prefix("fetch"));

    let skipped: Vec<Stage> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Pipeline(PipelineEvent::StageSkipped { stage }) => Some(stage),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, &Stage::ALL[1..]);
}

#[tokio::test]
async fn test_one_runtime_failure_fails_run_and_stops_later_runtimes() {
    let host = FakeHost::default();
    host.fail("install_packages 3.8 pytest setuptools wheel", 1, || {
        InstallError::PackageNotFound {
            package: "pytest".to_string(),
        }
        .into()
    });
    let (ctx, _rx) = context(&host, params_with(|_| {}));

    let err = provision(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Install(InstallError::PackageNotFound { .. })));
    assert_eq!(host.count("install_packages 3.8 pytest setuptools wheel"), 1);
    assert!(!host.has_prefix("run_script 3.9"));
    assert!(!host.has_prefix("probe"));
    // The failed runtime's working directory is still cleaned up
    let log = host.log();
    assert_eq!(log.last().map(String::as_str), Some("rmdir /var/tmp/polyenv/3.8"));
}

#[tokio::test]
async fn test_workdir_cleanup_failure_after_success_fails_run() {
    let host = FakeHost::default();
    // First rmdir clears leftovers, the second runs once 3.7 is installed
    host.fail_fs_after("rmdir /var/tmp/polyenv/3.7", 1);
    let (ctx, mut rx) = context(&host, params_with(|_| {}));

    let err = provision(&ctx).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Platform(PlatformError::FilesystemOperationFailed { .. })
    ));
    assert_eq!(host.count("install_packages 3.7 pytest setuptools wheel"), 1);
    assert!(!host.has_prefix("run_script 3.8"));

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Dependency(DependencyEvent::Failed { version, .. }) if *version == RuntimeVersion::new(3, 7)
    )));
    // Dependencies were installed; the state machine is not rewound
    assert!(!events.iter().any(|e| matches!(
        e,
        AppEvent::Dependency(DependencyEvent::StateChanged { to: RuntimeState::Failed, .. })
    )));
}

#[tokio::test]
async fn test_workdir_cleanup_failure_keeps_install_error() {
    let host = FakeHost::default();
    host.fail("install_packages 3.8 pytest setuptools wheel", 1, || {
        InstallError::PackageNotFound {
            package: "pytest".to_string(),
        }
        .into()
    });
    host.fail_fs_after("rmdir /var/tmp/polyenv/3.8", 1);
    let (ctx, mut rx) = context(&host, params_with(|_| {}));

    let err = provision(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Install(InstallError::PackageNotFound { .. })));
    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, AppEvent::General(GeneralEvent::Warning { message, .. }) if message.contains("/var/tmp/polyenv/3.8"))));
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Dependency(DependencyEvent::StateChanged { to: RuntimeState::Failed, .. })
    )));
}

#[tokio::test]
async fn test_package_cache_cleanup_failure_fails_runtime_stage() {
    let host = FakeHost::default();
    host.fail("cleanup", 1, || {
        InstallError::CleanupFailed {
            message: "/var/lib/apt/lists: Permission denied".to_string(),
        }
        .into()
    });
    let (ctx, mut rx) = context(&host, params_with(|_| {}));

    let err = provision(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Install(InstallError::CleanupFailed { .. })));
    assert_eq!(host.count("cleanup"), 1);
    assert!(!host.has_prefix("fetch"));

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Pipeline(PipelineEvent::StageFailed { stage: Stage::InstallRuntimes, .. })
    )));
    let skipped: Vec<Stage> = events
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Pipeline(PipelineEvent::StageSkipped { stage }) => Some(stage),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, &Stage::ALL[2..]);
}

#[tokio::test]
async fn test_transient_failures_within_bound_succeed() {
    let host = FakeHost::default();
    host.fail("refresh_index", 2, || {
        SourceError::IndexRefreshFailed {
            message: "Temporary failure resolving 'ppa.launchpadcontent.net'".to_string(),
        }
        .into()
    });
    let (ctx, _rx) = context(&host, params_with(|c| c.network.retries = 3));

    provision(&ctx).await.unwrap();
    assert_eq!(host.count("refresh_index"), 3);
}

#[tokio::test]
async fn test_transient_failures_beyond_bound_fail() {
    let host = FakeHost::default();
    host.fail("refresh_index", 3, || {
        SourceError::IndexRefreshFailed {
            message: "Temporary failure resolving 'ppa.launchpadcontent.net'".to_string(),
        }
        .into()
    });
    let (ctx, _rx) = context(&host, params_with(|c| c.network.retries = 3));

    assert!(provision(&ctx).await.is_err());
    assert_eq!(host.count("refresh_index"), 3);
    assert!(!host.has_prefix("install"));
}

#[tokio::test]
async fn test_artifact_fetch_is_single_attempt() {
    let host = FakeHost::default();
    let fetch_op = format!("fetch {ARTIFACT_URL}");
    host.fail(&fetch_op, 1, || {
        NetworkError::Timeout {
            url: ARTIFACT_URL.to_string(),
        }
        .into()
    });
    let (ctx, _rx) = context(&host, params_with(|c| c.network.retries = 5));

    let err = provision(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Network(NetworkError::Timeout { .. })));
    assert_eq!(host.count(&fetch_op), 1);
    assert!(!host.has_prefix("run_script"));
}

#[tokio::test]
async fn test_bootstrap_fetch_is_retried() {
    let host = FakeHost::default();
    let fetch_op = format!("fetch {BOOTSTRAP_URL}");
    host.fail(&fetch_op, 1, || {
        NetworkError::HttpError {
            status: 503,
            url: BOOTSTRAP_URL.to_string(),
        }
        .into()
    });
    let (ctx, _rx) = context(&host, params_with(|_| {}));

    provision(&ctx).await.unwrap();
    // One retry for 3.7, then one fetch each for 3.8 and 3.9
    assert_eq!(host.count(&fetch_op), 4);
}

#[tokio::test]
async fn test_bootstrap_checksum_mismatch_never_executes() {
    let host = FakeHost::default();
    let params = params_with(|c| {
        c.dependencies.bootstrap_checksums.insert(
            RuntimeVersion::new(3, 7),
            polyenv_hash::Hash::from_data(b"some other script"),
        );
    });
    let (ctx, _rx) = context(&host, params);

    let err = provision(&ctx).await.unwrap_err();

    assert!(matches!(err, Error::Integrity(_)));
    assert!(!host.has_prefix("run_script"));
}

#[tokio::test]
async fn test_bootstrap_checksum_match_executes() {
    let host = FakeHost::default();
    let params = params_with(|c| {
        c.dependencies.bootstrap_checksums.insert(
            RuntimeVersion::new(3, 7),
            polyenv_hash::Hash::from_data(format!("content of {BOOTSTRAP_URL}").as_bytes()),
        );
    });
    let (ctx, _rx) = context(&host, params);

    provision(&ctx).await.unwrap();
    assert_eq!(host.count("run_script 3.7"), 1);
}

#[tokio::test]
async fn test_artifact_mode_postcondition_enforced() {
    let host = FakeHost::default();
    host.force_mode(FileMode::from_bits(0o775));
    let (ctx, _rx) = context(&host, params_with(|_| {}));

    let err = provision(&ctx).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Permission(PermissionError::ModeMismatch { expected: 0o555, actual: 0o775, .. })
    ));
}

#[tokio::test]
async fn test_artifact_checksum_mismatch_writes_nothing() {
    let host = FakeHost::default();
    let params = params_with(|c| {
        c.artifact.checksum = Some(polyenv_hash::Hash::from_data(b"expected tool"));
    });
    let (ctx, _rx) = context(&host, params);

    assert!(matches!(provision(&ctx).await, Err(Error::Integrity(_))));
    assert!(!host.has_prefix("write /usr/local/bin/tool"));
}

#[tokio::test]
async fn test_repeated_runs_issue_same_operations() {
    let host = FakeHost::default();
    let (ctx, _rx) = context(&host, params_with(|_| {}));

    let first = provision(&ctx).await.unwrap();
    let first_log = host.log();
    let second = provision(&ctx).await.unwrap();
    let log = host.log();

    assert_eq!(&log[first_log.len()..], first_log.as_slice());
    assert_eq!(first.artifact.path, second.artifact.path);
    assert_eq!(first.artifact.mode, second.artifact.mode);
}

#[test]
fn test_plan_describes_run() {
    let params = params_with(|c| c.runtimes.versions = vec!["3.8".into(), "3.10".into()]);
    let plan = plan(&params);

    assert_eq!(plan.source, "ppa:deadsnakes/ppa");
    assert_eq!(plan.runtimes.entries.len(), 2);
    assert!(plan
        .system_packages
        .iter()
        .any(|p| p.as_str() == "python3.10-distutils"));
    assert_eq!(plan.artifact_url, ARTIFACT_URL);
    assert_eq!(plan.max_attempts, 3);

    let json = OperationResult::ProvisionPlan(plan).to_json().unwrap();
    assert!(json.contains("\"type\": \"ProvisionPlan\""));
}

#[test]
fn test_builder_requires_components() {
    assert!(OpsContextBuilder::new().build().is_err());
}
