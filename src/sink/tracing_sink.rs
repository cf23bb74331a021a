// src/sink/tracing_sink.rs

use tracing::{info, warn};

use super::{LogSink, StreamKind};

/// Forwards stdout lines as `info!` events and stderr lines as `warn!` events.
///
/// The optional `command` label is attached as a structured field so output
/// of concurrent runs can be told apart.
#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    command: Option<String>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
        }
    }
}

impl LogSink for TracingSink {
    fn emit(&self, stream: StreamKind, line: &str) {
        match (self.command.as_deref(), stream) {
            (Some(command), StreamKind::Stdout) => {
                info!(target: "procstream::output", command, "{}", line)
            }
            (Some(command), StreamKind::Stderr) => {
                warn!(target: "procstream::output", command, "{}", line)
            }
            (None, StreamKind::Stdout) => info!(target: "procstream::output", "{}", line),
            (None, StreamKind::Stderr) => warn!(target: "procstream::output", "{}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(sink: &TracingSink) -> String {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            sink.emit(StreamKind::Stdout, "hello");
            sink.emit(StreamKind::Stderr, "warn1");
        });

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn unlabelled_sink_has_no_command_field() {
        let out = capture(&TracingSink::new());

        assert!(out.contains("INFO procstream::output: hello"), "{out}");
        assert!(out.contains("WARN procstream::output: warn1"), "{out}");
        assert!(!out.contains("command"), "{out}");
    }

    #[test]
    fn labelled_sink_tags_every_line() {
        let out = capture(&TracingSink::with_command("okteto pipeline deploy"));

        assert_eq!(out.matches("command=\"okteto pipeline deploy\"").count(), 2, "{out}");
    }
}
