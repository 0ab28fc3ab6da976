// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::system::SystemOptions;

/// Job graph as read from a TOML file, before validation.
///
/// ```toml
/// [system]
/// workers = 4
///
/// [run]
/// cycles = 3
///
/// [job.load]
/// value = 2
///
/// [job.build]
/// value = 1
/// work_ms = 5
/// after = ["load"]
/// ```
///
/// All sections are optional and have reasonable defaults, but validation
/// requires at least one job.
#[derive(Debug, Clone, Deserialize)]
pub struct RawGraphFile {
    /// Worker pool options from `[system]`.
    #[serde(default)]
    pub system: SystemOptions,

    /// Run options from `[run]`.
    #[serde(default)]
    pub run: RunSection,

    /// All jobs from `[job.<name>]`, keyed by job name.
    #[serde(default)]
    pub job: BTreeMap<String, JobConfig>,
}

/// Validated job graph file.
///
/// Dependency cycles are *not* rejected here: detecting them is the
/// scheduler's responsibility, and a graph file is a convenient way to
/// demonstrate that.
#[derive(Debug, Clone)]
pub struct GraphFile {
    pub system: SystemOptions,
    pub run: RunSection,
    pub job: BTreeMap<String, JobConfig>,
}

impl GraphFile {
    /// Assemble a graph file without validation. Prefer `TryFrom<RawGraphFile>`.
    pub(crate) fn new_unchecked(
        system: SystemOptions,
        run: RunSection,
        job: BTreeMap<String, JobConfig>,
    ) -> Self {
        Self { system, run, job }
    }

    /// Names of jobs registered as roots.
    pub fn root_names(&self) -> impl Iterator<Item = &str> {
        self.job
            .iter()
            .filter(|(_, job)| job.root)
            .map(|(name, _)| name.as_str())
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunSection {
    /// Number of cycles to execute.
    #[serde(default = "default_cycles")]
    pub cycles: usize,
}

fn default_cycles() -> usize {
    1
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            cycles: default_cycles(),
        }
    }
}

/// `[job.<name>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobConfig {
    /// Value this job contributes to its total.
    #[serde(default = "default_value")]
    pub value: i64,

    /// Simulated work: how long the job sleeps when executed.
    #[serde(default)]
    pub work_ms: u64,

    /// Jobs that must execute before this one. Repeats are allowed.
    #[serde(default)]
    pub after: Vec<String>,

    /// Whether the job is registered as a root. Non-root jobs still run
    /// when a root depends on them.
    #[serde(default = "default_root")]
    pub root: bool,
}

fn default_value() -> i64 {
    1
}

fn default_root() -> bool {
    true
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            value: default_value(),
            work_ms: 0,
            after: Vec::new(),
            root: default_root(),
        }
    }
}
