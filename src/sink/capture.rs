// src/sink/capture.rs

//! Tee sink that keeps the last few lines of each stream.
//!
//! The runner wraps the user's sink in a [`CaptureSink`] so a failed run can
//! report what the process printed right before it exited.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::{LogSink, StreamKind};

#[derive(Debug, Default)]
struct Tails {
    stdout: VecDeque<String>,
    stderr: VecDeque<String>,
}

impl Tails {
    fn for_stream(&mut self, stream: StreamKind) -> &mut VecDeque<String> {
        match stream {
            StreamKind::Stdout => &mut self.stdout,
            StreamKind::Stderr => &mut self.stderr,
        }
    }
}

#[derive(Debug)]
pub struct CaptureSink<S> {
    inner: S,
    max_lines: usize,
    tails: Mutex<Tails>,
}

impl<S: LogSink> CaptureSink<S> {
    /// Wrap `inner`, remembering at most `max_lines` lines per stream.
    ///
    /// `max_lines = 0` disables capturing; lines are still forwarded.
    pub fn new(inner: S, max_lines: usize) -> Self {
        Self {
            inner,
            max_lines,
            tails: Mutex::new(Tails::default()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Captured lines of `stream`, oldest first, joined with `\n`.
    pub fn tail(&self, stream: StreamKind) -> String {
        let mut tails = self.lock();
        let lines = tails.for_stream(stream);
        lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }

    fn lock(&self) -> MutexGuard<'_, Tails> {
        // A panicking sink call must not take the capture down with it.
        self.tails.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<S: LogSink> LogSink for CaptureSink<S> {
    fn emit(&self, stream: StreamKind, line: &str) {
        self.inner.emit(stream, line);

        if self.max_lines == 0 {
            return;
        }
        let mut tails = self.lock();
        let lines = tails.for_stream(stream);
        if lines.len() == self.max_lines {
            lines.pop_front();
        }
        lines.push_back(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::TracingSink;

    #[test]
    fn keeps_only_the_last_lines_per_stream() {
        let sink = CaptureSink::new(TracingSink::new(), 2);
        sink.emit(StreamKind::Stdout, "one");
        sink.emit(StreamKind::Stdout, "two");
        sink.emit(StreamKind::Stderr, "oops");
        sink.emit(StreamKind::Stdout, "three");

        assert_eq!(sink.tail(StreamKind::Stdout), "two\nthree");
        assert_eq!(sink.tail(StreamKind::Stderr), "oops");
    }

    #[test]
    fn zero_capacity_captures_nothing() {
        let sink = CaptureSink::new(TracingSink::new(), 0);
        sink.emit(StreamKind::Stderr, "ignored");
        assert!(sink.tail(StreamKind::Stderr).is_empty());
    }
}
