// src/logging.rs

//! Logging setup for `procstream` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `PROCSTREAM_LOG` environment variable (e.g. "info", "debug")
//! 3. `[run].log_level` from the config file
//! 4. default to `info`
//!
//! Logs, including the streamed child output, go to STDERR.

use anyhow::{Result, anyhow};
use tracing_subscriber::fmt;

use crate::types::LogLevel;

pub const LOG_ENV_VAR: &str = "PROCSTREAM_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, config_level: Option<LogLevel>) -> Result<()> {
    let env_level = std::env::var(LOG_ENV_VAR).ok().and_then(|s| s.parse().ok());
    let level = resolve_level(cli_level, env_level, config_level);

    fmt()
        .with_max_level(tracing::Level::from(level))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(())
}

fn resolve_level(
    cli_level: Option<LogLevel>,
    env_level: Option<LogLevel>,
    config_level: Option<LogLevel>,
) -> LogLevel {
    cli_level.or(env_level).or(config_level).unwrap_or_default()
}
