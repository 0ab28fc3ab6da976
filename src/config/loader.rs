// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{GraphFile, RawGraphFile};
use crate::errors::Result;

/// Load a graph file from a given path and return the raw `RawGraphFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawGraphFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_str(&contents)
}

/// Parse graph file contents.
pub fn parse_str(contents: &str) -> Result<RawGraphFile> {
    let graph: RawGraphFile = toml::from_str(contents)?;
    Ok(graph)
}

/// Load a graph file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks for unknown `after` references and basic option sanity.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<GraphFile> {
    let raw = load_from_path(&path)?;
    GraphFile::try_from(raw)
}

/// Default graph file location: `Jobs.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Jobs.toml")
}
