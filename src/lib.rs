// src/lib.rs

pub mod cli;
pub mod command;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod sink;
pub mod types;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::command::{
    CommandSpec, DeployPipelineOptions, DestroyPipelineOptions, deploy_command, destroy_command,
};
use crate::config::ConfigFile;
use crate::errors::{ProcstreamError, Result};
use crate::exec::{RunOptions, RunReport, ensure_success, run_command};
use crate::sink::TracingSink;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - resolving the command to run from the subcommand / config
/// - run options (timeout, drain grace, capture) from CLI + config
/// - Ctrl-C handling
/// - one supervised run, mapped to an error if it did not succeed
pub async fn run(args: CliArgs, cfg: ConfigFile) -> Result<RunReport> {
    let spec = resolve_command(&args.command, &cfg)?;

    let cancel = CancellationToken::new();
    let options = RunOptions {
        cancel: cancel.clone(),
        timeout: args.timeout.or(cfg.run.timeout),
        drain_grace: cfg.run.drain_grace,
        capture_lines: cfg.run.capture_lines,
    };
    let timeout = options.timeout;

    // Ctrl-C → cancel the running command.
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            info!("Ctrl+C received; cancelling");
            cancel.cancel();
        }
    });

    let sink = Arc::new(TracingSink::with_command(spec.to_string()));
    let result = run_command(&spec, sink, options).await;
    ctrl_c.abort();

    let report = ensure_success(result?, timeout)?;
    debug!(elapsed = ?report.elapsed, "run succeeded");
    Ok(report)
}

/// Turn the chosen subcommand into a runnable [`CommandSpec`].
pub fn resolve_command(command: &CliCommand, cfg: &ConfigFile) -> Result<CommandSpec> {
    let spec = match command {
        CliCommand::Exec(exec) => {
            let mut spec = CommandSpec::new(&exec.program)
                .args(exec.args.iter().cloned())
                .inherit_env(!exec.clear_env);
            if let Some(cwd) = &exec.cwd {
                spec = spec.cwd(cwd);
            }
            for (key, value) in &exec.env {
                spec = spec.env(key, value);
            }
            spec
        }
        CliCommand::Config => cfg.command.clone().ok_or_else(|| {
            ProcstreamError::ConfigError(
                "no [command] section in the config file".to_string(),
            )
        })?,
        CliCommand::Deploy(deploy) => deploy_command(
            &deploy.bin,
            &DeployPipelineOptions {
                workdir: deploy.workdir.clone(),
                namespace: deploy.namespace.clone(),
                branch: deploy.branch.clone(),
                repository: deploy.repository.clone(),
                wait: deploy.wait,
            },
        ),
        CliCommand::Destroy(destroy) => destroy_command(
            &destroy.bin,
            &DestroyPipelineOptions {
                workdir: destroy.workdir.clone(),
                namespace: destroy.namespace.clone(),
                name: destroy.name.clone(),
            },
        ),
    };
    Ok(spec)
}

/// Process exit code for a failed run.
///
/// - a failed child passes its own exit code through,
/// - `124` on timeout and `130` on cancellation (shell conventions),
/// - `1` for everything else (launch, config, IO errors).
pub fn exit_code_for(err: &ProcstreamError) -> i32 {
    match err {
        ProcstreamError::ProcessFailed { code, .. } => code.filter(|c| *c != 0).unwrap_or(1),
        ProcstreamError::TimedOut { .. } => 124,
        ProcstreamError::Cancelled { .. } => 130,
        _ => 1,
    }
}
