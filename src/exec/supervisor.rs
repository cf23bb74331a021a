// src/exec/supervisor.rs

//! Process output supervisor.
//!
//! Lifecycle of one streaming cycle:
//!
//! 1. [`Supervisor::start`] launches the process with both pipes attached.
//! 2. [`Supervisor::begin_streaming`] spawns one unit per stream that forwards
//!    lines to the sink.
//! 3. The caller waits for the process through [`RunningProcess::wait`]
//!    (optionally followed by [`Supervisor::wait_for_eof`]).
//! 4. [`Supervisor::clean_up`] cancels the units and waits until they have
//!    stopped.
//!
//! Shutdown is lossy on purpose: lines still buffered when the cycle's token
//! fires are dropped instead of flushed. Callers cancel once they no longer
//! care about the remaining output.

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::command::CommandSpec;
use crate::errors::{ProcstreamError, Result};
use crate::sink::{LogSink, StreamKind};

use super::process::{self, RunningProcess};
use super::streaming::{UnitReport, drain_lines};

/// State of the one active streaming cycle.
#[derive(Debug)]
struct StreamingCycle {
    command: String,
    cancel: CancellationToken,
    units: TaskTracker,
    handles: Vec<JoinHandle<UnitReport>>,
}

/// Bridges a child's stdout/stderr into a [`LogSink`].
///
/// At most one streaming cycle is active per supervisor; a new one can begin
/// after the previous one was cleaned up.
pub struct Supervisor {
    sink: Arc<dyn LogSink>,
    cycle: Option<StreamingCycle>,
}

impl std::fmt::Debug for Supervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}

impl Supervisor {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink, cycle: None }
    }

    /// Launch `spec` with both output streams attached.
    ///
    /// On error nothing is left running and no streaming unit exists.
    pub fn start(&self, spec: &CommandSpec) -> Result<RunningProcess> {
        process::start(spec)
    }

    /// Whether a cycle has begun and not been cleaned up yet.
    pub fn is_streaming(&self) -> bool {
        self.cycle.is_some()
    }

    /// Start forwarding `process`'s output to the sink.
    ///
    /// Creates a fresh cancellation token for this cycle and spawns two
    /// units: stdout lines are emitted as [`StreamKind::Stdout`]
    /// (informational), stderr lines as [`StreamKind::Stderr`] (warnings).
    /// Each unit checks the token before emitting a line and stops on
    /// end-of-data by itself.
    ///
    /// Errors with [`ProcstreamError::StreamingActive`] if a cycle is still
    /// active, and with [`ProcstreamError::StreamsTaken`] if the process'
    /// pipes were already consumed.
    pub fn begin_streaming(&mut self, process: &mut RunningProcess) -> Result<()> {
        if self.cycle.is_some() {
            return Err(ProcstreamError::StreamingActive);
        }
        let (stdout, stderr) = process.take_streams().ok_or(ProcstreamError::StreamsTaken)?;

        let cancel = CancellationToken::new();
        let units = TaskTracker::new();

        let handles = vec![
            units.spawn(drain_lines(
                stdout,
                StreamKind::Stdout,
                Arc::clone(&self.sink),
                cancel.clone(),
            )),
            units.spawn(drain_lines(
                stderr,
                StreamKind::Stderr,
                Arc::clone(&self.sink),
                cancel.clone(),
            )),
        ];
        units.close();

        debug!(command = %process.command(), pid = ?process.id(), "streaming started");

        self.cycle = Some(StreamingCycle {
            command: process.command().to_string(),
            cancel,
            units,
            handles,
        });
        Ok(())
    }

    /// Wait up to `grace` for both units to reach end-of-data on their own.
    ///
    /// Useful after a normal exit, where the remaining output is still wanted.
    /// Returns `true` if both streams were fully drained (or no cycle is
    /// active), `false` if the grace period ran out first.
    pub async fn wait_for_eof(&self, grace: Duration) -> bool {
        let Some(cycle) = &self.cycle else {
            return true;
        };
        match tokio::time::timeout(grace, cycle.units.wait()).await {
            Ok(()) => true,
            Err(_) => {
                debug!(
                    command = %cycle.command,
                    ?grace,
                    "output streams still open after grace period"
                );
                false
            }
        }
    }

    /// Tear down the current cycle.
    ///
    /// Fires the cycle's token, then waits until both units have stopped.
    /// Once this returns no new line will be emitted; lines that were still
    /// buffered are dropped.
    ///
    /// `run_error` is the error observed while waiting on the process, if
    /// any. It is only logged.
    ///
    /// Returns how each unit ended, stdout first. A unit that panicked has
    /// no report.
    ///
    /// Meant to be called once per cycle, after [`begin_streaming`]. Calling
    /// it again, or without an active cycle, returns immediately with no
    /// reports.
    ///
    /// [`begin_streaming`]: Supervisor::begin_streaming
    pub async fn clean_up(
        &mut self,
        run_error: Option<&(dyn StdError + 'static)>,
    ) -> Vec<UnitReport> {
        let Some(cycle) = self.cycle.take() else {
            debug!("clean_up called without an active streaming cycle");
            return Vec::new();
        };

        match run_error {
            Some(err) => warn!(command = %cycle.command, error = %err, "process wait failed"),
            None => debug!(command = %cycle.command, "cleaning up streaming cycle"),
        }

        cycle.cancel.cancel();
        cycle.units.wait().await;

        let mut reports = Vec::with_capacity(cycle.handles.len());
        for handle in cycle.handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => warn!(command = %cycle.command, error = %e, "stream unit failed"),
            }
        }

        debug!(command = %cycle.command, "streaming cycle finished");
        reports
    }
}
