// src/config/mod.rs

//! Graph file loading.
//!
//! - [`model`] maps the TOML layout onto serde types.
//! - [`loader`] reads and parses files.
//! - [`validate`] turns a [`RawGraphFile`] into a checked [`GraphFile`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str};
pub use model::{GraphFile, JobConfig, RawGraphFile, RunSection};
