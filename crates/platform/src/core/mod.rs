//! Core platform abstractions and context management

use polyenv_events::{EventEmitter, EventSender};
use std::collections::HashMap;
use std::sync::Arc;

use crate::filesystem::FilesystemOperations;
use crate::interpreter::InterpreterOperations;
use crate::packages::PackageManager;
use crate::process::ProcessOperations;

/// Context for platform operations, providing event emission and metadata tracking
#[derive(Clone, Default)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
    operation_metadata: HashMap<String, String>,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    #[must_use]
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self {
            event_sender,
            operation_metadata: HashMap::new(),
        }
    }

    /// Add custom metadata to the context
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.operation_metadata.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.operation_metadata
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }

    fn correlation_id(&self) -> Option<String> {
        self.operation_metadata.get("run_id").cloned()
    }
}

/// Main platform abstraction providing access to all platform operations
#[derive(Clone)]
pub struct Platform {
    process_ops: Arc<dyn ProcessOperations>,
    filesystem_ops: Arc<dyn FilesystemOperations>,
    package_manager: Arc<dyn PackageManager>,
    interpreter_ops: Arc<dyn InterpreterOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementations
    #[must_use]
    pub fn new(
        process_ops: Arc<dyn ProcessOperations>,
        filesystem_ops: Arc<dyn FilesystemOperations>,
        package_manager: Arc<dyn PackageManager>,
        interpreter_ops: Arc<dyn InterpreterOperations>,
    ) -> Self {
        Self {
            process_ops,
            filesystem_ops,
            package_manager,
            interpreter_ops,
        }
    }

    /// Real Linux host: apt for system packages, `python{version}` interpreters
    #[must_use]
    pub fn current() -> Self {
        use crate::implementations::linux::{
            AptPackageManager, LinuxFilesystemOperations, LinuxProcessOperations,
            PythonInterpreter,
        };

        let process: Arc<dyn ProcessOperations> = Arc::new(LinuxProcessOperations::new());
        Self::new(
            process.clone(),
            Arc::new(LinuxFilesystemOperations::new()),
            Arc::new(AptPackageManager::new(process.clone())),
            Arc::new(PythonInterpreter::new(process)),
        )
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Access filesystem operations
    #[must_use]
    pub fn filesystem(&self) -> &dyn FilesystemOperations {
        &*self.filesystem_ops
    }

    /// Access the system package manager
    #[must_use]
    pub fn packages(&self) -> &dyn PackageManager {
        &*self.package_manager
    }

    /// Access interpreter operations
    #[must_use]
    pub fn interpreter(&self) -> &dyn InterpreterOperations {
        &*self.interpreter_ops
    }

    /// Create a platform context with event emission
    #[must_use]
    pub fn create_context(&self, event_sender: Option<EventSender>) -> PlatformContext {
        PlatformContext::new(event_sender)
    }
}
