//! Debian/Ubuntu image implementations

pub mod apt;
pub mod filesystem;
pub mod process;
pub mod python;

pub use apt::AptPackageManager;
pub use filesystem::LinuxFilesystemOperations;
pub use process::LinuxProcessOperations;
pub use python::PythonInterpreter;
