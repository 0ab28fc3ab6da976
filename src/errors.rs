// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::graph::CycleError;

#[derive(Error, Debug)]
pub enum JobSystemError {
    #[error("Cycle detected in job graph: {0}")]
    CycleDetected(#[from] CycleError),

    /// `execute` was called from inside a job of the cycle it would wait on.
    #[error("Re-entrant execute: job system is already running a cycle on this thread")]
    Reentrant,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JobSystemError {
    /// The cycle report, if this error is a cycle detection failure.
    pub fn as_cycle(&self) -> Option<&CycleError> {
        match self {
            JobSystemError::CycleDetected(cycle) => Some(cycle),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, JobSystemError>;
