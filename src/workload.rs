// src/workload.rs

//! Jobs built from a graph file.
//!
//! Each [`GraphJob`] sleeps for its configured work time, then records a
//! total: its own value plus the totals its dependencies produced in the
//! same cycle. The totals make dependency ordering observable from the
//! outside.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tracing::debug;

use crate::config::GraphFile;
use crate::job::{DependencySink, Job, JobRef, JobSet};

/// Job whose behaviour comes from a `[job.<name>]` section.
#[derive(Debug)]
pub struct GraphJob {
    name: String,
    value: i64,
    work: Duration,
    /// Weak so that cyclic graph files do not leak.
    deps: Mutex<Vec<Weak<GraphJob>>>,
    total: AtomicI64,
    runs: AtomicU64,
}

impl GraphJob {
    pub fn new(name: impl Into<String>, value: i64, work: Duration) -> Self {
        Self {
            name: name.into(),
            value,
            work,
            deps: Mutex::new(Vec::new()),
            total: AtomicI64::new(0),
            runs: AtomicU64::new(0),
        }
    }

    /// Make this job wait for `dep`.
    pub fn depend_on(&self, dep: &Arc<GraphJob>) {
        self.lock_deps().push(Arc::downgrade(dep));
    }

    /// Total computed by the last execution.
    pub fn total(&self) -> i64 {
        self.total.load(Ordering::Acquire)
    }

    /// How many times this job has executed.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Acquire)
    }

    fn live_deps(&self) -> Vec<Arc<GraphJob>> {
        self.lock_deps().iter().filter_map(Weak::upgrade).collect()
    }

    fn lock_deps(&self) -> std::sync::MutexGuard<'_, Vec<Weak<GraphJob>>> {
        self.deps.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Job for GraphJob {
    fn execute(&self) {
        if !self.work.is_zero() {
            std::thread::sleep(self.work);
        }

        // Deduplicate by identity: repeated `after` entries are one edge.
        let mut deps = self.live_deps();
        deps.sort_by_key(|d| Arc::as_ptr(d));
        deps.dedup_by(|a, b| Arc::ptr_eq(a, b));

        let total = self.value + deps.iter().map(|d| d.total()).sum::<i64>();
        self.total.store(total, Ordering::Release);
        self.runs.fetch_add(1, Ordering::AcqRel);
        debug!(job = %self.name, total, "job executed");
    }

    fn collect_dependencies(&self, sink: &mut DependencySink<'_>) {
        for dep in self.live_deps() {
            sink.report(dep);
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// All jobs of a graph file, keyed by name.
#[derive(Debug)]
pub struct Workload {
    jobs: BTreeMap<String, Arc<GraphJob>>,
}

impl Workload {
    /// Instantiate every job in `graph` and wire its `after` edges.
    ///
    /// Assumes `graph` is validated, so every `after` entry resolves.
    pub fn from_graph(graph: &GraphFile) -> Self {
        let jobs: BTreeMap<String, Arc<GraphJob>> = graph
            .job
            .iter()
            .map(|(name, cfg)| {
                let job = GraphJob::new(name.clone(), cfg.value, Duration::from_millis(cfg.work_ms));
                (name.clone(), Arc::new(job))
            })
            .collect();

        for (name, cfg) in graph.job.iter() {
            let Some(job) = jobs.get(name) else { continue };
            for dep in cfg.after.iter() {
                if let Some(dep_job) = jobs.get(dep) {
                    job.depend_on(dep_job);
                }
            }
        }

        Self { jobs }
    }

    /// Register the graph's root jobs with `set`.
    pub fn register_roots(&self, graph: &GraphFile, set: &dyn JobSet) {
        for name in graph.root_names() {
            if let Some(job) = self.jobs.get(name) {
                let job: JobRef = job.clone();
                set.add(&job);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<GraphJob>> {
        self.jobs.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<GraphJob>)> {
        self.jobs.iter().map(|(name, job)| (name.as_str(), job))
    }
}
