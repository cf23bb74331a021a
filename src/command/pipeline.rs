// src/command/pipeline.rs

//! Builders for the `pipeline deploy` / `pipeline destroy` sub-commands of an
//! external pipeline CLI.
//!
//! Empty strings are treated the same as unset options, so values coming
//! straight from CLI flags or config files can be passed through as-is.

use std::path::Path;

use super::CommandSpec;

/// Options appended to `<bin> pipeline deploy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployPipelineOptions {
    pub workdir: String,
    pub namespace: String,
    pub branch: String,
    pub repository: String,
    pub wait: bool,
}

/// Options appended to `<bin> pipeline destroy`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestroyPipelineOptions {
    pub workdir: String,
    pub namespace: String,
    pub name: String,
}

/// `<bin> pipeline deploy [--branch B] [--repository R] [--wait] [--namespace N]`
pub fn deploy_command(bin: impl AsRef<Path>, opts: &DeployPipelineOptions) -> CommandSpec {
    let mut spec = CommandSpec::new(bin.as_ref()).args(["pipeline", "deploy"]);

    spec = with_flag(spec, "--branch", &opts.branch);
    spec = with_flag(spec, "--repository", &opts.repository);
    if opts.wait {
        spec = spec.arg("--wait");
    }
    spec = with_flag(spec, "--namespace", &opts.namespace);

    with_workdir(spec, &opts.workdir)
}

/// `<bin> pipeline destroy [--name N] [--namespace N]`
pub fn destroy_command(bin: impl AsRef<Path>, opts: &DestroyPipelineOptions) -> CommandSpec {
    let mut spec = CommandSpec::new(bin.as_ref()).args(["pipeline", "destroy"]);

    spec = with_flag(spec, "--name", &opts.name);
    spec = with_flag(spec, "--namespace", &opts.namespace);

    with_workdir(spec, &opts.workdir)
}

fn with_flag(spec: CommandSpec, flag: &str, value: &str) -> CommandSpec {
    if value.is_empty() {
        spec
    } else {
        spec.arg(flag).arg(value)
    }
}

fn with_workdir(spec: CommandSpec, workdir: &str) -> CommandSpec {
    if workdir.is_empty() {
        spec
    } else {
        spec.cwd(workdir)
    }
}
