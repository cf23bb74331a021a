// src/command/mod.rs

//! Command descriptions handed to the supervisor.
//!
//! - [`spec`] holds [`CommandSpec`], the resolved program/args/cwd/env.
//! - [`pipeline`] builds specs for the `pipeline deploy` and
//!   `pipeline destroy` sub-commands.

pub mod pipeline;
pub mod spec;

pub use pipeline::{DeployPipelineOptions, DestroyPipelineOptions, deploy_command, destroy_command};
pub use spec::{CommandSpec, parse_env_pair};
