// src/system/mod.rs

//! The job system: root registry plus the per-cycle pipeline
//! collect → validate → execute.

pub mod options;

use std::cell::RefCell;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::errors::{JobSystemError, Result};
use crate::exec::Executor;
use crate::graph::{CycleError, collect, schedule};
use crate::job::{JobRef, JobSet, RootSet};
use crate::logging::Logger;

pub use options::SystemOptions;

/// Where the system currently is in its cycle.
///
/// A cycle moves `Idle → CollectingDependencies`, then either
/// `CycleDetected → Failed` or `Acyclic → Scheduling → Running → Completed`,
/// and always ends back in `Idle`, even when a job panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    /// Walking the dependency closure and validating it.
    CollectingDependencies,
    CycleDetected,
    Failed,
    Acyclic,
    /// Seeding the ready queue and dependency counters.
    Scheduling,
    Running,
    Completed,
}

impl CycleState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => CycleState::CollectingDependencies,
            2 => CycleState::CycleDetected,
            3 => CycleState::Failed,
            4 => CycleState::Acyclic,
            5 => CycleState::Scheduling,
            6 => CycleState::Running,
            7 => CycleState::Completed,
            _ => CycleState::Idle,
        }
    }
}

static NEXT_SYSTEM_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    /// Systems with a cycle in progress on this thread.
    static ACTIVE_CYCLES: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Summary of a successful cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Jobs executed (size of the dependency closure).
    pub jobs: usize,
    /// Distinct dependency edges.
    pub edges: usize,
    /// Root jobs the closure was collected from.
    pub roots: usize,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Dependency-driven job scheduler.
///
/// Jobs registered with [`add`](Self::add) run every cycle, together with
/// every job they (transitively) report as a dependency. Each call to
/// [`execute`](Self::execute) rebuilds the dependency graph from scratch,
/// rejects it if it contains a cycle, and otherwise runs each job exactly
/// once in dependency order on the worker pool.
///
/// Cycles of one system are serialized. Calling `execute` on the same system
/// from inside one of its own jobs fails with [`JobSystemError::Reentrant`]
/// instead of waiting on itself.
#[derive(Debug)]
pub struct JobSystem {
    id: usize,
    roots: RootSet,
    executor: Executor,
    state: AtomicU8,
    cycle_lock: Mutex<()>,
}

impl JobSystem {
    /// Create a system with `workers` worker threads.
    ///
    /// `0` is clamped to `1`; a single worker runs everything sequentially
    /// on the thread calling [`execute`](Self::execute).
    pub fn new(workers: usize) -> Result<Self> {
        Self::with_options(SystemOptions::with_workers(workers))
    }

    pub fn with_options(options: SystemOptions) -> Result<Self> {
        let requested = options.resolved_workers();
        let workers = if requested == 0 {
            warn!("worker count of 0 requested; clamping to 1");
            1
        } else {
            requested
        };

        Ok(Self {
            id: NEXT_SYSTEM_ID.fetch_add(1, Ordering::Relaxed),
            roots: RootSet::new(),
            executor: Executor::new(workers, &options.thread_name)?,
            state: AtomicU8::new(CycleState::Idle as u8),
            cycle_lock: Mutex::new(()),
        })
    }

    /// Register `job` as a root. No-op if already registered.
    pub fn add(&self, job: &JobRef) {
        self.roots.insert(job);
    }

    /// Unregister `job`. No-op if not registered.
    pub fn remove(&self, job: &JobRef) {
        self.roots.take(job);
    }

    pub fn contains(&self, job: &JobRef) -> bool {
        self.roots.contains(job)
    }

    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Unregister every root.
    pub fn clear(&self) {
        self.roots.clear();
    }

    pub fn worker_count(&self) -> usize {
        self.executor.worker_count()
    }

    pub fn state(&self) -> CycleState {
        CycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Run one cycle.
    ///
    /// Returns `false` if the dependency graph contains a cycle, or if called
    /// from inside one of this system's own jobs. In both cases no job ran
    /// and, if given, `logger` received a description of the failure.
    /// Returns `true` once every job has executed.
    pub fn execute(&self, logger: Option<&dyn Logger>) -> bool {
        match self.try_execute() {
            Ok(_) => true,
            Err(err) => {
                if let Some(logger) = logger {
                    logger.error(&format!("JobSystem::execute - {err}"));
                }
                false
            }
        }
    }

    /// Run one cycle, returning a [`CycleReport`] or the reason it failed.
    pub fn try_execute(&self) -> Result<CycleReport> {
        if self.is_running_on_current_thread() {
            warn!("execute called from inside a running job; refusing");
            return Err(JobSystemError::Reentrant);
        }

        let _lock = self.cycle_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let _cycle = ActiveCycle::enter(self);
        self.run_cycle(Instant::now())
    }

    fn is_running_on_current_thread(&self) -> bool {
        ACTIVE_CYCLES.with(|active| active.borrow().contains(&self.id))
            || self.executor.owns_current_thread()
    }

    fn run_cycle(&self, started: Instant) -> Result<CycleReport> {
        let roots = self.roots.snapshot();

        self.set_state(CycleState::CollectingDependencies);
        let graph = collect(&roots);
        debug!(
            roots = graph.root_count(),
            jobs = graph.len(),
            edges = graph.edge_count(),
            "dependencies collected"
        );

        let plan = schedule(&graph).map_err(|err: CycleError| {
            self.set_state(CycleState::CycleDetected);
            debug!(
                blocked = err.blocked,
                cycles = err.cycles.len(),
                "cycle detected; nothing executed"
            );
            self.set_state(CycleState::Failed);
            JobSystemError::from(err)
        })?;
        self.set_state(CycleState::Acyclic);

        self.set_state(CycleState::Scheduling);
        let dispatch = self.executor.prepare(&graph, &plan);

        self.set_state(CycleState::Running);
        let executed = self.executor.run(dispatch);
        debug_assert_eq!(executed, graph.len());
        self.set_state(CycleState::Completed);

        let report = CycleReport {
            jobs: executed,
            edges: graph.edge_count(),
            roots: graph.root_count(),
            workers: self.worker_count(),
            elapsed: started.elapsed(),
        };
        debug!(
            jobs = report.jobs,
            workers = report.workers,
            elapsed_us = report.elapsed.as_micros() as u64,
            "cycle completed"
        );
        Ok(report)
    }

    fn set_state(&self, state: CycleState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

/// Marks a cycle of `system` as running on this thread. Dropping it, also
/// during unwinding, clears the mark and returns the system to `Idle`.
struct ActiveCycle<'a> {
    system: &'a JobSystem,
}

impl<'a> ActiveCycle<'a> {
    fn enter(system: &'a JobSystem) -> Self {
        ACTIVE_CYCLES.with(|active| active.borrow_mut().push(system.id));
        Self { system }
    }
}

impl Drop for ActiveCycle<'_> {
    fn drop(&mut self) {
        ACTIVE_CYCLES.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|&id| id == self.system.id) {
                active.remove(pos);
            }
        });
        self.system.set_state(CycleState::Idle);
    }
}

impl JobSet for JobSystem {
    fn add(&self, job: &JobRef) {
        JobSystem::add(self, job);
    }

    fn remove(&self, job: &JobRef) {
        JobSystem::remove(self, job);
    }
}
