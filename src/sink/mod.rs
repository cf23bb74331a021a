// src/sink/mod.rs

//! Log sinks that receive the lines drained from a child process.
//!
//! Each streaming unit calls [`LogSink::emit`] once per line, tagged with the
//! [`StreamKind`] it was read from:
//!
//! - [`StreamKind::Stdout`] lines are informational entries.
//! - [`StreamKind::Stderr`] lines are warning entries.
//!
//! Both units share the same sink, so implementations must accept concurrent
//! calls and keep each call atomic. Order is only meaningful within a single
//! stream.

use std::fmt;

pub mod capture;
pub mod tracing_sink;

pub use capture::CaptureSink;
pub use tracing_sink::TracingSink;

/// Which output stream of the child a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StreamKind::Stdout => "stdout",
            StreamKind::Stderr => "stderr",
        }
    }

    /// Severity the line is logged with.
    pub fn level(self) -> tracing::Level {
        match self {
            StreamKind::Stdout => tracing::Level::INFO,
            StreamKind::Stderr => tracing::Level::WARN,
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destination for captured process output.
pub trait LogSink: Send + Sync {
    /// Record one line read from `stream`. The line has no trailing newline.
    fn emit(&self, stream: StreamKind, line: &str);
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn emit(&self, stream: StreamKind, line: &str) {
        (**self).emit(stream, line);
    }
}
