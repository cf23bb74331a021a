// src/exec/mod.rs

//! Process execution layer.
//!
//! This module launches commands with `tokio::process::Command` and bridges
//! their stdout/stderr into a [`LogSink`](crate::sink::LogSink).
//!
//! - [`process`] launches a [`CommandSpec`](crate::command::CommandSpec) with
//!   both pipes attached and returns a [`RunningProcess`].
//! - [`streaming`] contains the per-stream unit that forwards lines until
//!   end-of-data or cancellation.
//! - [`supervisor`] owns one streaming cycle at a time and tears it down
//!   deterministically.
//! - [`runner`] drives a whole cycle with cancellation, timeout and output
//!   capture, producing a [`RunReport`].

pub mod process;
pub mod runner;
pub mod streaming;
pub mod supervisor;

pub use process::{RunningProcess, start};
pub use runner::{RunOptions, RunReport, ensure_success, run_command};
pub use streaming::{StopReason, UnitReport};
pub use supervisor::Supervisor;
