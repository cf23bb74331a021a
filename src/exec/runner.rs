// src/exec/runner.rs

//! One full supervision cycle for a single command.
//!
//! The runner adds caller-level policy on top of [`Supervisor`]:
//! - external cancellation through a [`CancellationToken`],
//! - an optional timeout,
//! - a grace period to drain remaining output after a normal exit,
//! - capturing the tail of both streams for the final [`RunReport`].

use std::process::ExitStatus;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::CommandSpec;
use crate::errors::{ProcstreamError, Result};
use crate::sink::{CaptureSink, LogSink, StreamKind};

use super::Supervisor;

pub const DEFAULT_CAPTURE_LINES: usize = 20;
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Caller-side knobs for [`run_command`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Cancel the run from outside (e.g. Ctrl-C). The process is killed.
    pub cancel: CancellationToken,
    /// Kill the process if it runs longer than this.
    pub timeout: Option<Duration>,
    /// How long to keep draining output after the process exited normally.
    pub drain_grace: Duration,
    /// Number of trailing lines per stream kept in the report.
    pub capture_lines: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            cancel: CancellationToken::new(),
            timeout: None,
            drain_grace: DEFAULT_DRAIN_GRACE,
            capture_lines: DEFAULT_CAPTURE_LINES,
        }
    }
}

/// What happened to one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub command: String,
    /// `None` if the process was killed by a signal, cancelled or timed out.
    pub exit_code: Option<i32>,
    pub success: bool,
    pub cancelled: bool,
    pub timed_out: bool,
    pub elapsed: Duration,
    pub stdout_tail: String,
    pub stderr_tail: String,
}

enum Ending {
    Exited(std::io::Result<ExitStatus>),
    Cancelled,
    TimedOut(Duration),
}

/// Run `spec` to completion, streaming its output into `sink`.
///
/// Launch problems are returned as errors. A process that launched but
/// failed, was cancelled or timed out still yields `Ok(RunReport)`; use
/// [`ensure_success`] to turn that into an error.
pub async fn run_command(
    spec: &CommandSpec,
    sink: Arc<dyn LogSink>,
    options: RunOptions,
) -> Result<RunReport> {
    let capture = Arc::new(CaptureSink::new(sink, options.capture_lines));
    let mut supervisor = Supervisor::new(capture.clone());

    info!(command = %spec, "starting process");
    let started = Instant::now();

    let mut process = supervisor.start(spec)?;
    supervisor.begin_streaming(&mut process)?;

    let deadline = async {
        match options.timeout {
            Some(after) => {
                tokio::time::sleep(after).await;
                after
            }
            None => std::future::pending().await,
        }
    };

    let ending = tokio::select! {
        biased;
        () = options.cancel.cancelled() => Ending::Cancelled,
        after = deadline => Ending::TimedOut(after),
        status = process.wait() => Ending::Exited(status),
    };

    if !matches!(ending, Ending::Exited(_)) {
        if let Err(e) = process.kill().await {
            warn!(command = %spec, error = %e, "failed to kill process");
        }
    }

    let mut cancelled = false;
    let mut timed_out = false;
    let (exit_status, wait_error) = match ending {
        // A terminal Ctrl-C reaches the child too, so it may exit before
        // the token is observed.
        Ending::Exited(Ok(status)) if !status.success() && options.cancel.is_cancelled() => {
            info!(command = %spec, "run cancelled; process exited on its own");
            cancelled = true;
            (Some(status), None)
        }
        Ending::Exited(Ok(status)) => {
            if !supervisor.wait_for_eof(options.drain_grace).await {
                debug!(command = %spec, "dropping output still buffered after exit");
            }
            (Some(status), None)
        }
        Ending::Exited(Err(e)) => (None, Some(e)),
        Ending::Cancelled => {
            info!(command = %spec, "run cancelled; process killed");
            cancelled = true;
            (None, None)
        }
        Ending::TimedOut(after) => {
            warn!(command = %spec, ?after, "run timed out; process killed");
            timed_out = true;
            (None, None)
        }
    };

    let units = supervisor
        .clean_up(wait_error.as_ref().map(|e| e as &(dyn std::error::Error + 'static)))
        .await;
    let lines: u64 = units.iter().map(|u| u.emitted).sum();

    if let Some(e) = wait_error {
        return Err(ProcstreamError::Wait(e));
    }

    let elapsed = started.elapsed();
    let exit_code = exit_status.and_then(|s| s.code());
    let success = exit_status.is_some_and(|s| s.success());

    info!(
        command = %spec,
        exit_code = ?exit_code,
        success,
        lines,
        elapsed_ms = elapsed.as_millis() as u64,
        "process finished"
    );

    Ok(RunReport {
        command: spec.to_string(),
        exit_code,
        success,
        cancelled,
        timed_out,
        elapsed,
        stdout_tail: capture.tail(StreamKind::Stdout),
        stderr_tail: capture.tail(StreamKind::Stderr),
    })
}

/// Map an unsuccessful report to the matching error.
pub fn ensure_success(report: RunReport, timeout: Option<Duration>) -> Result<RunReport> {
    if report.success {
        return Ok(report);
    }
    if report.cancelled {
        return Err(ProcstreamError::Cancelled {
            command: report.command,
        });
    }
    if report.timed_out {
        return Err(ProcstreamError::TimedOut {
            command: report.command,
            after: timeout.unwrap_or(report.elapsed),
        });
    }
    Err(ProcstreamError::ProcessFailed {
        command: report.command,
        code: report.exit_code,
        stderr_tail: report.stderr_tail,
    })
}
