//! Process execution through `tokio::process`

use async_trait::async_trait;
use polyenv_errors::{Error, PlatformError};
use polyenv_events::{AppEvent, EventEmitter, FailureContext, PlatformEvent, ProcessCommandDescriptor};
use std::convert::TryFrom;
use std::time::{Duration, Instant};
use tokio::process::Command;

use crate::core::PlatformContext;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};

/// Linux implementation of process operations
#[derive(Debug, Default)]
pub struct LinuxProcessOperations;

impl LinuxProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn byte_len(bytes: &[u8]) -> u64 {
    u64::try_from(bytes.len()).unwrap_or(u64::MAX)
}

#[async_trait]
impl ProcessOperations for LinuxProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let descriptor = ProcessCommandDescriptor {
            program: cmd.program().to_string(),
            args: cmd.get_args().to_vec(),
            cwd: cmd.get_current_dir().cloned(),
        };

        ctx.emit(AppEvent::Platform(PlatformEvent::ProcessStarted {
            command: descriptor.clone(),
        }));
        tracing::debug!(command = %cmd.display_line(), "spawning process");

        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args());
        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }
        for (key, value) in cmd.get_env_vars() {
            command.env(key, value);
        }

        let result = command.output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PlatformError::CommandNotFound {
                    command: cmd.program().to_string(),
                }
            } else {
                PlatformError::ProcessExecutionFailed {
                    command: cmd.program().to_string(),
                    message: e.to_string(),
                }
            }
        });

        let duration_ms = duration_to_millis(start.elapsed());
        match result {
            Ok(output) => {
                ctx.emit(AppEvent::Platform(PlatformEvent::ProcessCompleted {
                    command: descriptor,
                    exit_code: output.status.code(),
                    duration_ms,
                    stdout_bytes: byte_len(&output.stdout),
                    stderr_bytes: byte_len(&output.stderr),
                }));
                Ok(CommandOutput {
                    status: output.status,
                    stdout: output.stdout,
                    stderr: output.stderr,
                })
            }
            Err(e) => {
                let err = Error::from(e);
                ctx.emit(AppEvent::Platform(PlatformEvent::ProcessFailed {
                    command: descriptor,
                    failure: FailureContext::from_error(&err),
                    duration_ms,
                }));
                Err(err)
            }
        }
    }
}
