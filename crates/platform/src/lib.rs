#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for provisioning a Linux image.
//!
//! Every host capability the pipeline touches sits behind a trait:
//! - Process execution with event emission
//! - Filesystem writes with explicit permission bits
//! - The system package manager (trusted sources, index refresh, installs)
//! - Interpreter invocation (bootstrap scripts, dependency installs, probes)
//!
//! [`Platform::current`] wires the real Linux implementations; tests build a
//! [`Platform`] from in-memory fakes instead.

pub mod core;
pub mod filesystem;
pub mod implementations;
pub mod interpreter;
pub mod packages;
pub mod process;

pub use core::{Platform, PlatformContext};

pub use filesystem::FilesystemOperations;
pub use interpreter::InterpreterOperations;
pub use packages::PackageManager;
pub use process::{CommandOutput, PlatformCommand, ProcessOperations};
