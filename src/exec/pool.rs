// src/exec/pool.rs

//! Worker pool that runs a validated schedule.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::{Scope, ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use crate::errors::Result;
use crate::graph::{JobGraph, Schedule};

/// Executes one cycle's graph.
///
/// - `Sequential` runs every job on the calling thread in schedule order.
/// - `Pool` owns a fixed set of worker threads and dispatches jobs as their
///   dependencies complete.
pub enum Executor {
    Sequential,
    Pool(ThreadPool),
}

impl Executor {
    /// Build an executor with `workers` threads. One worker means sequential
    /// execution on the caller's thread.
    pub fn new(workers: usize, thread_name: &str) -> Result<Self> {
        if workers <= 1 {
            debug!("executor: sequential");
            return Ok(Executor::Sequential);
        }

        let prefix = thread_name.to_string();
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()?;

        debug!(workers, "executor: thread pool started");
        Ok(Executor::Pool(pool))
    }

    pub fn worker_count(&self) -> usize {
        match self {
            Executor::Sequential => 1,
            Executor::Pool(pool) => pool.current_num_threads(),
        }
    }

    /// Whether the calling thread is one of this executor's workers.
    ///
    /// Always `false` for the sequential executor, whose jobs run on the
    /// caller's own thread.
    pub fn owns_current_thread(&self) -> bool {
        match self {
            Executor::Sequential => false,
            Executor::Pool(pool) => pool.current_thread_index().is_some(),
        }
    }

    /// Turn a validated schedule into a dispatch: the ready queue seed and
    /// one unfinished-dependency counter per job.
    pub fn prepare<'g>(&self, graph: &'g JobGraph, schedule: &'g Schedule) -> Dispatch<'g> {
        let remaining = match self {
            Executor::Sequential => Vec::new(),
            Executor::Pool(_) => schedule
                .in_degrees()
                .iter()
                .map(|&d| AtomicUsize::new(d))
                .collect(),
        };
        trace!(ready = schedule.ready().len(), "dispatch prepared");
        Dispatch {
            graph,
            schedule,
            remaining,
        }
    }

    /// Run every job of `dispatch` once. Blocks until all jobs have
    /// finished.
    ///
    /// Returns the number of jobs executed.
    pub fn run(&self, dispatch: Dispatch<'_>) -> usize {
        let Dispatch {
            graph,
            schedule,
            remaining,
        } = dispatch;

        match self {
            Executor::Sequential => {
                for &vertex in schedule.order() {
                    run_job(graph, vertex);
                }
                schedule.order().len()
            }
            Executor::Pool(pool) => {
                let executed = AtomicUsize::new(0);

                let cycle = PoolCycle {
                    graph,
                    remaining: &remaining,
                    executed: &executed,
                };

                pool.scope(|scope| {
                    for &vertex in schedule.ready() {
                        cycle.spawn(scope, vertex);
                    }
                });

                executed.into_inner()
            }
        }
    }
}

/// A validated cycle ready to hand to the workers.
pub struct Dispatch<'g> {
    graph: &'g JobGraph,
    schedule: &'g Schedule,
    remaining: Vec<AtomicUsize>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Executor::Sequential => f.write_str("Executor::Sequential"),
            Executor::Pool(pool) => f
                .debug_tuple("Executor::Pool")
                .field(&pool.current_num_threads())
                .finish(),
        }
    }
}

/// Shared state of one parallel cycle.
#[derive(Clone, Copy)]
struct PoolCycle<'a> {
    graph: &'a JobGraph,
    /// Unfinished dependency count per vertex.
    remaining: &'a [AtomicUsize],
    executed: &'a AtomicUsize,
}

impl<'a> PoolCycle<'a> {
    fn spawn(self, scope: &Scope<'a>, vertex: usize) {
        scope.spawn(move |scope| {
            run_job(self.graph, vertex);
            self.executed.fetch_add(1, Ordering::Relaxed);

            for &dependent in self.graph.dependents_of(vertex) {
                // AcqRel: the last finishing dependency publishes the writes of
                // all earlier ones to whichever worker runs the dependent.
                if self.remaining[dependent].fetch_sub(1, Ordering::AcqRel) == 1 {
                    self.spawn(scope, dependent);
                }
            }
        });
    }
}

fn run_job(graph: &JobGraph, vertex: usize) {
    let job = graph.job(vertex);
    trace!(job = %job.name(), vertex, "executing job");
    job.execute();
}
