// src/graph/topo.rs

//! Kahn's-algorithm ordering and cycle detection.
//!
//! Validation runs to completion before anything executes: either every
//! vertex receives a position in the order, or the graph is rejected.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use petgraph::algo::tarjan_scc;
use petgraph::graph::DiGraph;
use tracing::trace;

use crate::graph::JobGraph;

/// Topological schedule of one cycle's graph.
#[derive(Debug, Clone)]
pub struct Schedule {
    order: Vec<usize>,
    ready: Vec<usize>,
    in_degrees: Vec<usize>,
}

impl Schedule {
    /// A valid sequential execution order (dependencies first).
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Vertices with no dependencies: the executor's initial ready set.
    pub fn ready(&self) -> &[usize] {
        &self.ready
    }

    /// In-degree of every vertex before anything has run.
    pub fn in_degrees(&self) -> &[usize] {
        &self.in_degrees
    }
}

/// The dependency closure contains at least one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// Jobs that could not be scheduled: cycle members plus anything that
    /// (transitively) depends on them.
    pub blocked: usize,
    /// Total number of jobs in the closure.
    pub total: usize,
    /// Each cycle found, as the names of its members.
    pub cycles: Vec<Vec<String>>,
}

impl CycleError {
    /// Whether any reported cycle contains a job named `name`.
    pub fn involves(&self, name: &str) -> bool {
        self.cycles.iter().any(|c| c.iter().any(|n| n == name))
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} jobs cannot be scheduled",
            self.blocked, self.total
        )?;
        for cycle in &self.cycles {
            if cycle.len() == 1 {
                write!(f, "; job '{}' depends on itself", cycle[0])?;
            } else {
                write!(f, "; cycle between [{}]", cycle.join(", "))?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CycleError {}

/// Order `graph` with Kahn's algorithm.
///
/// Starts from every vertex with in-degree zero, repeatedly takes one from
/// the frontier and releases its dependents. Any vertex still holding a
/// positive in-degree once the frontier is exhausted sits on, or behind, a
/// cycle.
pub fn schedule(graph: &JobGraph) -> Result<Schedule, CycleError> {
    let in_degrees = graph.in_degrees();
    let mut remaining = in_degrees.clone();

    let ready: Vec<usize> = (0..graph.len()).filter(|&v| remaining[v] == 0).collect();
    let mut frontier: VecDeque<usize> = ready.iter().copied().collect();
    let mut order = Vec::with_capacity(graph.len());

    while let Some(vertex) = frontier.pop_front() {
        order.push(vertex);
        for &dependent in graph.dependents_of(vertex) {
            remaining[dependent] -= 1;
            if remaining[dependent] == 0 {
                frontier.push_back(dependent);
            }
        }
    }

    if order.len() == graph.len() {
        trace!(jobs = order.len(), ready = ready.len(), "graph is acyclic");
        return Ok(Schedule {
            order,
            ready,
            in_degrees,
        });
    }

    let blocked: Vec<usize> = (0..graph.len()).filter(|&v| remaining[v] > 0).collect();
    Err(CycleError {
        blocked: blocked.len(),
        total: graph.len(),
        cycles: find_cycles(graph, &blocked),
    })
}

/// Name the cycles inside the unschedulable residue.
///
/// Strongly connected components of more than one vertex, or a single vertex
/// with a self-edge, are cycles. Everything else in the residue is merely
/// waiting on one of them.
fn find_cycles(graph: &JobGraph, blocked: &[usize]) -> Vec<Vec<String>> {
    let mut residue: DiGraph<usize, ()> = DiGraph::with_capacity(blocked.len(), 0);
    let nodes: HashMap<usize, _> = blocked
        .iter()
        .map(|&v| (v, residue.add_node(v)))
        .collect();

    for &vertex in blocked {
        for dep in graph.dependencies_of(vertex) {
            if let Some(&dep_node) = nodes.get(dep) {
                residue.add_edge(dep_node, nodes[&vertex], ());
            }
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&residue)
        .into_iter()
        .filter(|scc| scc.len() > 1 || residue.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut members: Vec<usize> = scc.into_iter().map(|n| residue[n]).collect();
            members.sort_unstable();
            members
                .into_iter()
                .map(|v| graph.job(v).name().into_owned())
                .collect()
        })
        .collect();
    cycles.sort();
    cycles
}
