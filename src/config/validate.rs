// src/config/validate.rs

use std::time::Duration;

use crate::command::CommandSpec;
use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawCommandSection, RawConfigFile, RawRunSection, RunSettings};
use crate::errors::{ProcstreamError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ProcstreamError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let run = validate_run_section(&raw.run)?;
        let command = raw.command.map(validate_command_section).transpose()?;
        Ok(ConfigFile { run, command })
    }
}

fn validate_run_section(raw: &RawRunSection) -> Result<RunSettings> {
    let defaults = RunSettings::default();

    let timeout = raw
        .timeout
        .as_deref()
        .map(|s| config_duration("[run].timeout", s))
        .transpose()?;
    if timeout == Some(Duration::ZERO) {
        return Err(ProcstreamError::ConfigError(
            "[run].timeout must be greater than zero".to_string(),
        ));
    }

    let drain_grace = match raw.drain_grace.as_deref() {
        Some(s) => config_duration("[run].drain_grace", s)?,
        None => defaults.drain_grace,
    };

    Ok(RunSettings {
        timeout,
        drain_grace,
        capture_lines: raw.capture_lines.unwrap_or(defaults.capture_lines),
        log_level: raw.log_level,
    })
}

fn validate_command_section(raw: RawCommandSection) -> Result<CommandSpec> {
    if raw.program.trim().is_empty() {
        return Err(ProcstreamError::ConfigError(
            "[command].program must not be empty".to_string(),
        ));
    }
    if let Some(key) = raw.env.keys().find(|k| k.is_empty() || k.contains('=')) {
        return Err(ProcstreamError::ConfigError(format!(
            "[command.env] has invalid variable name '{key}'"
        )));
    }

    let mut spec = CommandSpec::new(raw.program)
        .args(raw.args)
        .inherit_env(raw.inherit_env);
    if let Some(cwd) = raw.cwd {
        spec = spec.cwd(cwd);
    }
    for (key, value) in raw.env {
        spec = spec.env(key, value);
    }
    Ok(spec)
}

fn config_duration(field: &str, value: &str) -> Result<Duration> {
    parse_duration(value)
        .map_err(|e| ProcstreamError::ConfigError(format!("{field}: {e}")))
}
