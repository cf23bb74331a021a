// src/errors.rs

//! Crate-wide error type and result alias.

use std::time::Duration;

use thiserror::Error;

use crate::sink::StreamKind;

#[derive(Error, Debug)]
pub enum ProcstreamError {
    /// A stdout/stderr pipe was not available on the launched child.
    #[error("could not attach to {stream} of the child process")]
    StreamAttachment { stream: StreamKind },

    /// The OS refused to start the process (missing binary, permissions, ...).
    #[error("failed to launch '{program}': {source}")]
    ProcessLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("a streaming cycle is already active on this supervisor")]
    StreamingActive,

    #[error("output streams of this process were already consumed")]
    StreamsTaken,

    #[error("waiting for process exit: {0}")]
    Wait(#[source] std::io::Error),

    /// The process launched but did not exit successfully.
    #[error("{command} exited with {}: {stderr_tail}", exit_label(.code))]
    ProcessFailed {
        command: String,
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("{command} was cancelled")]
    Cancelled { command: String },

    #[error("{command} timed out after {after:?}")]
    TimedOut { command: String, after: Duration },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProcstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_failed_message_includes_code_and_stderr() {
        let err = ProcstreamError::ProcessFailed {
            command: "okteto pipeline deploy".to_string(),
            code: Some(2),
            stderr_tail: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "okteto pipeline deploy exited with exit code 2: boom"
        );
    }

    #[test]
    fn process_failed_without_code_mentions_signal() {
        let err = ProcstreamError::ProcessFailed {
            command: "sleep 10".to_string(),
            code: None,
            stderr_tail: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
