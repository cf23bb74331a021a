// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::command::CommandSpec;
use crate::types::LogLevel;

/// Configuration file as read from TOML, before validation.
///
/// ```toml
/// [run]
/// timeout = "10m"
/// drain_grace = "1s"
/// capture_lines = 20
/// log_level = "info"
///
/// [command]
/// program = "okteto"
/// args = ["pipeline", "deploy", "--wait"]
/// cwd = "services/api"
///
/// [command.env]
/// OKTETO_NAMESPACE = "dev"
/// ```
///
/// Both sections are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RawRunSection,

    #[serde(default)]
    pub command: Option<RawCommandSection>,
}

/// `[run]` section: caller-level policy for a supervision cycle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRunSection {
    /// Duration string (e.g. `"30s"`); the process is killed after it.
    #[serde(default)]
    pub timeout: Option<String>,

    /// How long output is still drained after the process exited.
    #[serde(default)]
    pub drain_grace: Option<String>,

    /// Trailing lines per stream kept for failure reports.
    #[serde(default)]
    pub capture_lines: Option<usize>,

    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

/// `[command]` section: the command run by `procstream config`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCommandSection {
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default = "default_inherit_env")]
    pub inherit_env: bool,
}

fn default_inherit_env() -> bool {
    true
}

/// Validated run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub timeout: Option<Duration>,
    pub drain_grace: Duration,
    pub capture_lines: usize,
    pub log_level: Option<LogLevel>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            timeout: None,
            drain_grace: crate::exec::runner::DEFAULT_DRAIN_GRACE,
            capture_lines: crate::exec::runner::DEFAULT_CAPTURE_LINES,
            log_level: None,
        }
    }
}

/// Validated configuration; build it from [`RawConfigFile`] via `TryFrom`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub run: RunSettings,
    pub command: Option<CommandSpec>,
}
