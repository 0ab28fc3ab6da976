// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::Parser;

use crate::config::default_config_path;
use crate::logging::LogLevel;

/// Command-line arguments for `jobsystem`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jobsystem",
    version,
    about = "Run a dependency-ordered job graph on a worker pool.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the job graph file (TOML).
    ///
    /// Default: `Jobs.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Number of cycles to run, overriding `[run].cycles`.
    #[arg(long, value_name = "N")]
    pub cycles: Option<usize>,

    /// Worker thread count, overriding `[system].workers`.
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `JOBSYSTEM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the graph, but don't execute any jobs.
    #[arg(long)]
    pub dry_run: bool,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
