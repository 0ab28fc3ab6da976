// src/logging.rs

//! Logging for `jobsystem`.
//!
//! Two separate concerns live here:
//! - [`init_logging`] installs the global `tracing-subscriber` used for
//!   diagnostics. Level priority:
//!   1. `--log-level` CLI flag (if provided)
//!   2. `JOBSYSTEM_LOG` environment variable (e.g. "info", "debug")
//!   3. default to `info`
//! - [`Logger`] is the optional sink callers hand to
//!   [`JobSystem::execute`](crate::JobSystem::execute) to receive a
//!   descriptive message when a cycle fails.
//!
//! Logs are sent to STDERR so stdout stays free for job output.

use anyhow::Result;
use clap::ValueEnum;
use tracing_subscriber::fmt;

/// Log level, shared by the CLI and [`Logger`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Destination for scheduler diagnostics.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);

    fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }
}

/// [`Logger`] that forwards every message as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => tracing::error!(target: "jobsystem::logger", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "jobsystem::logger", "{message}"),
            LogLevel::Info => tracing::info!(target: "jobsystem::logger", "{message}"),
            LogLevel::Debug => tracing::debug!(target: "jobsystem::logger", "{message}"),
            LogLevel::Trace => tracing::trace!(target: "jobsystem::logger", "{message}"),
        }
    }
}

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let level = match cli_level {
        Some(lvl) => level_from_log_level(lvl),
        None => std::env::var("JOBSYSTEM_LOG")
            .ok()
            .and_then(|s| parse_level_str(&s))
            .unwrap_or(tracing::Level::INFO),
    };

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

/// Parse a level name as accepted by `JOBSYSTEM_LOG`.
pub fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
