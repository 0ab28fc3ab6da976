#![allow(dead_code)]

use std::collections::BTreeMap;

use jobsystem::SystemOptions;
use jobsystem::config::{GraphFile, JobConfig, RawGraphFile, RunSection};

/// Builder for `GraphFile` to simplify test setup.
pub struct GraphFileBuilder {
    graph: RawGraphFile,
}

impl GraphFileBuilder {
    pub fn new() -> Self {
        Self {
            graph: RawGraphFile {
                system: SystemOptions::default(),
                run: RunSection::default(),
                job: BTreeMap::new(),
            },
        }
    }

    pub fn with_job(mut self, name: &str, job: JobConfig) -> Self {
        self.graph.job.insert(name.to_string(), job);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.graph.system.workers = Some(workers);
        self
    }

    pub fn with_cycles(mut self, cycles: usize) -> Self {
        self.graph.run.cycles = cycles;
        self
    }

    pub fn raw(self) -> RawGraphFile {
        self.graph
    }

    pub fn build(self) -> GraphFile {
        GraphFile::try_from(self.graph).expect("Failed to build valid graph from builder")
    }
}

impl Default for GraphFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `JobConfig`.
pub struct JobConfigBuilder {
    job: JobConfig,
}

impl JobConfigBuilder {
    pub fn new(value: i64) -> Self {
        Self {
            job: JobConfig {
                value,
                ..JobConfig::default()
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.job.after.push(dep.to_string());
        self
    }

    pub fn work_ms(mut self, ms: u64) -> Self {
        self.job.work_ms = ms;
        self
    }

    pub fn root(mut self, val: bool) -> Self {
        self.job.root = val;
        self
    }

    pub fn build(self) -> JobConfig {
        self.job
    }
}
