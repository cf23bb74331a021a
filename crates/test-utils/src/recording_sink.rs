use std::sync::Mutex;
use std::time::Duration;

use procstream::sink::{LogSink, StreamKind};

/// One line as the sink received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub stream: StreamKind,
    pub line: String,
}

/// A sink that records every emitted line, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Entry>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().unwrap().clone()
    }

    /// Lines of one stream, in the order they were emitted.
    pub fn lines(&self, stream: StreamKind) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.stream == stream)
            .map(|e| e.line.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Poll until at least `count` lines arrived or `limit` elapsed.
    /// Returns whether the count was reached.
    pub async fn wait_for_len(&self, count: usize, limit: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + limit;
        while tokio::time::Instant::now() < deadline {
            if self.len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.len() >= count
    }
}

impl LogSink for RecordingSink {
    fn emit(&self, stream: StreamKind, line: &str) {
        self.entries.lock().unwrap().push(Entry {
            stream,
            line: line.to_string(),
        });
    }
}
