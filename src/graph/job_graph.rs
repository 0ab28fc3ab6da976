// src/graph/job_graph.rs

use crate::job::JobRef;

/// Per-vertex adjacency: immediate deps and dependents, by vertex index.
#[derive(Debug, Clone, Default)]
struct JobNode {
    /// Direct dependencies, deduplicated.
    deps: Vec<usize>,
    /// Jobs that list this one among their deps.
    dependents: Vec<usize>,
}

/// Dependency closure of one cycle.
///
/// Vertices are indices into `jobs`, in discovery order (roots first). The
/// graph is rebuilt for every cycle and dropped afterwards, which is also
/// what releases the scheduler's references to non-root jobs.
pub struct JobGraph {
    jobs: Vec<JobRef>,
    nodes: Vec<JobNode>,
    roots: usize,
    edges: usize,
}

impl JobGraph {
    /// Build a graph from discovered jobs and their deduplicated dependency
    /// lists. `deps[v]` lists the vertices `v` waits on.
    pub(crate) fn from_dependencies(jobs: Vec<JobRef>, deps: Vec<Vec<usize>>, roots: usize) -> Self {
        let mut nodes: Vec<JobNode> = deps
            .into_iter()
            .map(|deps| JobNode {
                deps,
                dependents: Vec::new(),
            })
            .collect();

        // Second pass: populate dependents based on deps.
        let mut edges = 0;
        for vertex in 0..nodes.len() {
            for i in 0..nodes[vertex].deps.len() {
                let dep = nodes[vertex].deps[i];
                nodes[dep].dependents.push(vertex);
                edges += 1;
            }
        }

        Self {
            jobs,
            nodes,
            roots,
            edges,
        }
    }

    /// Number of jobs in the closure.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Number of distinct dependency edges.
    pub fn edge_count(&self) -> usize {
        self.edges
    }

    /// Number of root jobs the closure was collected from.
    pub fn root_count(&self) -> usize {
        self.roots
    }

    pub fn job(&self, vertex: usize) -> &JobRef {
        &self.jobs[vertex]
    }

    /// Immediate dependencies of a vertex.
    pub fn dependencies_of(&self, vertex: usize) -> &[usize] {
        self.nodes
            .get(vertex)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a vertex.
    pub fn dependents_of(&self, vertex: usize) -> &[usize] {
        self.nodes
            .get(vertex)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Initial in-degree of every vertex (its count of unsatisfied deps).
    pub fn in_degrees(&self) -> Vec<usize> {
        self.nodes.iter().map(|n| n.deps.len()).collect()
    }
}

impl std::fmt::Debug for JobGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobGraph")
            .field("jobs", &self.jobs.len())
            .field("roots", &self.roots)
            .field("edges", &self.edges)
            .finish()
    }
}
