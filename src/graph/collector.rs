// src/graph/collector.rs

//! Breadth-first discovery of the dependency closure.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::trace;

use crate::graph::JobGraph;
use crate::job::{DependencySink, JobKey, JobRef};

/// Accumulates vertices while the closure is walked.
#[derive(Default)]
struct Discovery {
    index: HashMap<JobKey, usize>,
    jobs: Vec<JobRef>,
    pending: VecDeque<usize>,
}

impl Discovery {
    /// Vertex index of `job`, registering it (and queueing it for collection)
    /// on first sight.
    fn intern(&mut self, job: JobRef) -> usize {
        let key = JobKey::of(&job);
        if let Some(&vertex) = self.index.get(&key) {
            return vertex;
        }

        let vertex = self.jobs.len();
        trace!(job = %job.name(), vertex, "discovered job");
        self.index.insert(key, vertex);
        self.jobs.push(job);
        self.pending.push_back(vertex);
        vertex
    }
}

/// Walk the transitive closure of `roots`.
///
/// `collect_dependencies` is invoked exactly once on every discovered job.
/// Repeated reports of the same dependency from one job collapse into a
/// single edge, so the dependency only has to complete once.
pub fn collect(roots: &[JobRef]) -> JobGraph {
    let mut discovery = Discovery::default();

    for root in roots {
        discovery.intern(root.clone());
    }
    let root_count = discovery.jobs.len();

    let mut deps: Vec<Vec<usize>> = Vec::new();

    while let Some(vertex) = discovery.pending.pop_front() {
        let job = discovery.jobs[vertex].clone();

        let mut direct: Vec<usize> = Vec::new();
        let mut seen: HashSet<usize> = HashSet::new();
        {
            let mut report = |dep: JobRef| {
                let dep_vertex = discovery.intern(dep);
                if seen.insert(dep_vertex) {
                    direct.push(dep_vertex);
                }
            };
            job.collect_dependencies(&mut DependencySink::new(&mut report));
        }

        // Vertices are popped in discovery order, so `vertex == deps.len()`.
        debug_assert_eq!(vertex, deps.len());
        deps.push(direct);
    }

    JobGraph::from_dependencies(discovery.jobs, deps, root_count)
}
