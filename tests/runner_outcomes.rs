// tests/runner_outcomes.rs
#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;

use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use procstream::command::CommandSpec;
use procstream::errors::ProcstreamError;
use procstream::exec::{RunOptions, ensure_success, run_command};
use procstream::sink::StreamKind;
use procstream_test_utils::scripts::{print_stdout_lines, sh};
use procstream_test_utils::{RecordingSink, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn successful_run_reports_exit_code_and_tails() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let spec = sh("echo hello; echo warn1 >&2");

    let report = with_timeout(run_command(&spec, sink.clone(), RunOptions::default())).await?;

    assert!(report.success);
    assert_eq!(report.exit_code, Some(0));
    assert!(!report.cancelled && !report.timed_out);
    assert_eq!(report.stdout_tail, "hello");
    assert_eq!(report.stderr_tail, "warn1");
    assert_eq!(report.command, spec.to_string());

    assert_eq!(sink.lines(StreamKind::Stdout), vec!["hello"]);
    assert_eq!(sink.lines(StreamKind::Stderr), vec!["warn1"]);

    ensure_success(report, None)?;
    Ok(())
}

#[tokio::test]
async fn capture_keeps_only_the_configured_tail() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let options = RunOptions {
        capture_lines: 2,
        ..RunOptions::default()
    };
    let spec = print_stdout_lines(&["one", "two", "three", "four"]);

    let report = with_timeout(run_command(&spec, sink.clone(), options)).await?;

    assert_eq!(report.stdout_tail, "three\nfour");
    // The sink itself still sees everything.
    assert_eq!(sink.len(), 4);
    Ok(())
}

#[tokio::test]
async fn non_zero_exit_is_a_process_failure_not_a_launch_error() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let spec = sh("echo 'deploy failed: no manifest' >&2; exit 3");

    let report = with_timeout(run_command(&spec, sink.clone(), RunOptions::default())).await?;
    assert!(!report.success);
    assert_eq!(report.exit_code, Some(3));

    match ensure_success(report, None) {
        Err(ProcstreamError::ProcessFailed {
            code, stderr_tail, ..
        }) => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr_tail, "deploy failed: no manifest");
        }
        other => panic!("expected ProcessFailed, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn launch_failure_is_returned_before_any_output() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let spec = CommandSpec::new("/no/such/okteto").args(["pipeline", "deploy"]);

    let result = with_timeout(run_command(&spec, sink.clone(), RunOptions::default())).await;

    assert!(matches!(result, Err(ProcstreamError::ProcessLaunch { .. })));
    assert!(sink.is_empty());
    Ok(())
}

#[tokio::test]
async fn timeout_kills_the_process() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let timeout = Duration::from_millis(200);
    let options = RunOptions {
        timeout: Some(timeout),
        ..RunOptions::default()
    };

    let started = Instant::now();
    let report = with_timeout(run_command(&sh("echo going; sleep 30"), sink.clone(), options)).await?;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(report.timed_out);
    assert!(!report.success);
    assert_eq!(report.exit_code, None);
    assert!(matches!(
        ensure_success(report, Some(timeout)),
        Err(ProcstreamError::TimedOut { after, .. }) if after == timeout
    ));
    Ok(())
}

#[tokio::test]
async fn external_cancellation_kills_the_process() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let cancel = CancellationToken::new();
    let options = RunOptions {
        cancel: cancel.clone(),
        ..RunOptions::default()
    };

    let canceller = {
        let sink = sink.clone();
        tokio::spawn(async move {
            sink.wait_for_len(1, Duration::from_secs(5)).await;
            cancel.cancel();
        })
    };

    let report = with_timeout(run_command(&sh("echo ready; sleep 30"), sink.clone(), options)).await?;
    canceller.await?;

    assert!(report.cancelled);
    assert!(!report.timed_out);
    assert_eq!(sink.lines(StreamKind::Stdout), vec!["ready"]);
    assert!(matches!(
        ensure_success(report, None),
        Err(ProcstreamError::Cancelled { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn background_child_holding_pipes_does_not_hang_the_run() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let options = RunOptions {
        drain_grace: Duration::from_millis(500),
        ..RunOptions::default()
    };

    // The shell exits right away but leaves `sleep` behind with our pipes.
    let spec = sh("echo parent; sleep 3 & exit 0");
    let report = with_timeout(run_command(&spec, sink.clone(), options)).await?;

    assert!(report.success);
    assert_eq!(sink.lines(StreamKind::Stdout), vec!["parent"]);
    Ok(())
}

#[tokio::test]
async fn non_utf8_output_does_not_break_the_pipe() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let spec = sh("printf 'ok\\n\\377bad\\nafter\\n'; sleep 0.3; echo more; echo stillhere >&2");

    let report = with_timeout(run_command(&spec, sink.clone(), RunOptions::default())).await?;

    assert!(report.success);
    assert_eq!(report.exit_code, Some(0));
    assert_eq!(
        sink.lines(StreamKind::Stdout),
        vec!["ok", "\u{FFFD}bad", "after", "more"]
    );
    assert_eq!(sink.lines(StreamKind::Stderr), vec!["stillhere"]);
    Ok(())
}

#[tokio::test]
async fn cancellation_wins_over_a_process_that_already_failed() -> TestResult {
    init_tracing();

    let sink = Arc::new(RecordingSink::new());
    let cancel = CancellationToken::new();
    cancel.cancel();
    let options = RunOptions {
        cancel,
        ..RunOptions::default()
    };

    let report = with_timeout(run_command(&sh("exit 1"), sink.clone(), options)).await?;

    assert!(report.cancelled);
    assert!(!report.success);
    assert!(matches!(
        ensure_success(report, None),
        Err(ProcstreamError::Cancelled { .. })
    ));
    Ok(())
}
