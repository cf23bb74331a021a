// src/config/mod.rs

//! Optional `Procstream.toml` configuration.
//!
//! - [`model`] holds the raw (serde) and validated shapes.
//! - [`validate`] turns raw into validated via `TryFrom`.
//! - [`loader`] reads files from disk.
//! - [`duration`] parses `"250ms"` / `"3s"` / `"1m"` / `"2h"` strings.

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, RawCommandSection, RawConfigFile, RawRunSection, RunSettings};
