// src/exec/streaming.rs

//! The per-stream draining unit.
//!
//! A unit is a two-state machine: it stays *running* while it reads lines and
//! forwards them to the sink, and moves to *stopped* once it observes
//! cancellation, end-of-data, or a read error. It never goes back.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::sink::{LogSink, StreamKind};

/// Why a unit stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The process closed the stream.
    EndOfStream,
    /// The cycle's token fired; unread lines were dropped.
    Cancelled,
    /// Reading failed with an I/O error. Treated like end-of-data.
    ReadError,
}

/// Summary of one unit's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitReport {
    pub stream: StreamKind,
    pub emitted: u64,
    pub stop: StopReason,
}

/// Read `reader` line by line and forward each line to `sink` until the
/// stream ends or `cancel` fires.
///
/// Lines are split on `\n` with a trailing `\r` removed. Bytes that are not
/// valid UTF-8 are replaced with U+FFFD; they never stop the unit.
///
/// Cancellation is checked while waiting for the next line and again right
/// before a line is emitted, so once the token has fired no further line
/// reaches the sink, even if it was already buffered.
pub async fn drain_lines<R>(
    reader: R,
    stream: StreamKind,
    sink: Arc<dyn LogSink>,
    cancel: CancellationToken,
) -> UnitReport
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).split(b'\n');
    let mut emitted = 0u64;

    let stop = loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            next = lines.next_segment() => Some(next),
        };

        let Some(next) = next else {
            break StopReason::Cancelled;
        };

        match next {
            Ok(Some(mut line)) => {
                if cancel.is_cancelled() {
                    break StopReason::Cancelled;
                }
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                sink.emit(stream, &String::from_utf8_lossy(&line));
                emitted += 1;
            }
            Ok(None) => break StopReason::EndOfStream,
            Err(err) => {
                debug!(%stream, error = %err, "read error; stopping stream");
                break StopReason::ReadError;
            }
        }
    };

    debug!(%stream, emitted, stop = ?stop, "stream unit stopped");
    UnitReport {
        stream,
        emitted,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio::io::AsyncWriteExt;

    use super::*;

    #[derive(Default)]
    struct VecSink(Mutex<Vec<(StreamKind, String)>>);

    impl VecSink {
        fn lines(&self) -> Vec<(StreamKind, String)> {
            self.0.lock().unwrap().clone()
        }
    }

    impl LogSink for VecSink {
        fn emit(&self, stream: StreamKind, line: &str) {
            self.0.lock().unwrap().push((stream, line.to_string()));
        }
    }

    #[tokio::test]
    async fn forwards_lines_in_order_until_eof() {
        let sink = Arc::new(VecSink::default());
        let input: &[u8] = b"first\nsecond\r\nthird";

        let report = drain_lines(
            input,
            StreamKind::Stderr,
            sink.clone(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(report.stop, StopReason::EndOfStream);
        assert_eq!(report.emitted, 3);
        let lines: Vec<String> = sink.lines().into_iter().map(|(_, l)| l).collect();
        assert_eq!(lines, vec!["first", "second", "third"]);
        assert!(sink.lines().iter().all(|(s, _)| *s == StreamKind::Stderr));
    }

    #[tokio::test]
    async fn already_cancelled_token_drops_buffered_lines() {
        let sink = Arc::new(VecSink::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let input: &[u8] = b"a\nb\nc\n";
        let report = drain_lines(input, StreamKind::Stdout, sink.clone(), cancel).await;

        assert_eq!(report.stop, StopReason::Cancelled);
        assert_eq!(report.emitted, 0);
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn lines_written_after_cancellation_are_never_emitted() {
        let sink = Arc::new(VecSink::default());
        let cancel = CancellationToken::new();
        let (mut writer, reader) = tokio::io::duplex(64);

        let unit = tokio::spawn(drain_lines(
            reader,
            StreamKind::Stdout,
            sink.clone() as Arc<dyn LogSink>,
            cancel.clone(),
        ));

        writer.write_all(b"before\n").await.unwrap();
        for _ in 0..50 {
            if !sink.lines().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        // The unit is now parked on the next read.
        cancel.cancel();
        let report = unit.await.unwrap();
        let _ = writer.write_all(b"after\n").await;

        assert_eq!(report.stop, StopReason::Cancelled);
        assert_eq!(
            sink.lines(),
            vec![(StreamKind::Stdout, "before".to_string())]
        );
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced_and_later_lines_still_arrive() {
        let sink = Arc::new(VecSink::default());
        let input: &[u8] = b"ok\n\xffbad\r\nafter\n";

        let report = drain_lines(
            input,
            StreamKind::Stdout,
            sink.clone(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(report.stop, StopReason::EndOfStream);
        assert_eq!(report.emitted, 3);
        let lines: Vec<String> = sink.lines().into_iter().map(|(_, l)| l).collect();
        assert_eq!(lines, vec!["ok", "\u{FFFD}bad", "after"]);
    }
}
