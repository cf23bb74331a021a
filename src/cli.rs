// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::command::parse_env_pair;
use crate::config::parse_duration;

pub use crate::types::LogLevel;

/// Command-line arguments for `procstream`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procstream",
    version,
    about = "Run a command and stream its stdout/stderr into the log.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Procstream.toml` in the current working directory, if it
    /// exists.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCSTREAM_LOG`, `[run].log_level` or `info` is used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Kill the command if it runs longer than this (e.g. `30s`, `5m`).
    #[arg(long, global = true, value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run an arbitrary program.
    Exec(ExecArgs),
    /// Run the `[command]` section of the config file.
    Config,
    /// Run `<bin> pipeline deploy`.
    Deploy(DeployArgs),
    /// Run `<bin> pipeline destroy`.
    Destroy(DestroyArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ExecArgs {
    /// Working directory for the program.
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Extra environment variable, repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    /// Start from an empty environment instead of inheriting ours.
    #[arg(long)]
    pub clear_env: bool,

    /// Program to run.
    #[arg(value_name = "PROGRAM")]
    pub program: PathBuf,

    /// Arguments passed to the program.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    /// Pipeline CLI binary.
    #[arg(long, value_name = "PATH", default_value = "okteto")]
    pub bin: PathBuf,

    #[arg(long, value_name = "DIR", default_value = "")]
    pub workdir: String,

    #[arg(long, default_value = "")]
    pub namespace: String,

    #[arg(long, default_value = "")]
    pub branch: String,

    #[arg(long, default_value = "")]
    pub repository: String,

    /// Wait until the pipeline finishes.
    #[arg(long)]
    pub wait: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DestroyArgs {
    /// Pipeline CLI binary.
    #[arg(long, value_name = "PATH", default_value = "okteto")]
    pub bin: PathBuf,

    #[arg(long, value_name = "DIR", default_value = "")]
    pub workdir: String,

    #[arg(long, default_value = "")]
    pub namespace: String,

    /// Pipeline name.
    #[arg(long, default_value = "")]
    pub name: String,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
