// src/exec/process.rs

//! Launching a child process with both output streams attached.

use std::process::ExitStatus;

use tokio::process::{Child, ChildStderr, ChildStdout};
use tracing::{debug, warn};

use crate::command::CommandSpec;
use crate::errors::{ProcstreamError, Result};
use crate::sink::StreamKind;

/// A launched child plus its not-yet-consumed output pipes.
///
/// The pipes are handed over to the streaming units exactly once by
/// [`Supervisor::begin_streaming`](super::Supervisor::begin_streaming); the
/// child itself stays here so the caller can wait on or kill it.
///
/// Dropping the handle kills the child.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    command: String,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl RunningProcess {
    /// OS process id, if the process has not been reaped yet.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Display form of the command this process was started from.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Wait for the process to exit.
    ///
    /// Cancel-safe, so it can sit in a `tokio::select!` next to a
    /// cancellation branch.
    pub async fn wait(&mut self) -> std::io::Result<ExitStatus> {
        self.child.wait().await
    }

    /// Kill the process and reap it.
    pub async fn kill(&mut self) -> std::io::Result<()> {
        self.child.kill().await
    }

    pub(crate) fn take_streams(&mut self) -> Option<(ChildStdout, ChildStderr)> {
        match (self.stdout.take(), self.stderr.take()) {
            (Some(out), Some(err)) => Some((out, err)),
            (out, err) => {
                // Put back whatever was left so the handle stays consistent.
                self.stdout = out;
                self.stderr = err;
                None
            }
        }
    }
}

/// Launch `spec` with stdout and stderr piped.
///
/// Pipes are configured on the command before the process is spawned, so
/// nothing the child writes early can be missed.
///
/// Errors:
/// - [`ProcstreamError::ProcessLaunch`] when the OS refuses to start the
///   program.
/// - [`ProcstreamError::StreamAttachment`] when the child came up without
///   one of the pipes. The child is killed on the way out.
///
/// Must be called from within a Tokio runtime.
pub fn start(spec: &CommandSpec) -> Result<RunningProcess> {
    let command = spec.to_string();
    debug!(command = %command, cwd = ?spec.get_cwd(), "launching process");

    let mut child = spec
        .to_command()
        .spawn()
        .map_err(|source| ProcstreamError::ProcessLaunch {
            program: spec.program().display().to_string(),
            source,
        })?;

    let Some(stdout) = child.stdout.take() else {
        warn!(command = %command, "stdout pipe missing after launch; killing process");
        return Err(ProcstreamError::StreamAttachment {
            stream: StreamKind::Stdout,
        });
    };
    let Some(stderr) = child.stderr.take() else {
        warn!(command = %command, "stderr pipe missing after launch; killing process");
        return Err(ProcstreamError::StreamAttachment {
            stream: StreamKind::Stderr,
        });
    };

    debug!(command = %command, pid = ?child.id(), "process launched");

    Ok(RunningProcess {
        child,
        command,
        stdout: Some(stdout),
        stderr: Some(stderr),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_fails_with_launch_error_for_missing_binary() {
        let spec = CommandSpec::new("/definitely/not/here/procstream-missing");
        match start(&spec) {
            Err(ProcstreamError::ProcessLaunch { program, source }) => {
                assert_eq!(program, "/definitely/not/here/procstream-missing");
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected ProcessLaunch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn streams_can_only_be_taken_once() {
        let mut process = start(&CommandSpec::new("true")).expect("start true");
        assert!(process.take_streams().is_some());
        assert!(process.take_streams().is_none());
        let status = process.wait().await.expect("wait");
        assert!(status.success());
    }
}
