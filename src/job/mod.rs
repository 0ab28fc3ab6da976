// src/job/mod.rs

//! Job abstraction and root registration.
//!
//! - [`Job`] is the capability every schedulable unit exposes: an execution
//!   body plus a per-cycle dependency report.
//! - [`DependencySink`] is what a job reports its dependencies into.
//! - [`root_set`] holds the cycle-persistent set of jobs that must run.

pub mod root_set;

use std::any::type_name;
use std::borrow::Cow;
use std::sync::Arc;

pub use root_set::{JobSet, RootSet};

/// Shared handle to a job.
///
/// Ownership is split between the scheduler and whichever subsystem created
/// the job.
pub type JobRef = Arc<dyn Job>;

/// A unit of work that can be scheduled by the [`JobSystem`](crate::JobSystem).
///
/// Bodies run on worker threads, hence `Send + Sync`. Any state a job shares
/// between its own `execute` and `collect_dependencies` calls is the
/// implementer's to synchronize.
pub trait Job: Send + Sync {
    /// Perform the job's work for the current cycle.
    fn execute(&self);

    /// Report every job that must finish before this one runs.
    ///
    /// Called once per cycle. Must reflect the job's *current* dependencies.
    /// Reporting the same dependency more than once is allowed and counts as
    /// a single edge.
    fn collect_dependencies(&self, sink: &mut DependencySink<'_>);

    /// Human readable label used in diagnostics.
    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(type_name::<Self>())
    }
}

/// Receiver for the dependencies a job reports during collection.
pub struct DependencySink<'a> {
    report: &'a mut dyn FnMut(JobRef),
}

impl<'a> DependencySink<'a> {
    pub fn new(report: &'a mut dyn FnMut(JobRef)) -> Self {
        Self { report }
    }

    /// Report `job` as a dependency of the job being collected.
    pub fn report(&mut self, job: JobRef) {
        (self.report)(job);
    }

    /// Report every job yielded by `jobs`.
    pub fn report_all<I>(&mut self, jobs: I)
    where
        I: IntoIterator<Item = JobRef>,
    {
        for job in jobs {
            self.report(job);
        }
    }
}

/// Identity of a job: the address of its shared allocation.
///
/// Only meaningful while a [`JobRef`] to the job is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct JobKey(usize);

impl JobKey {
    pub(crate) fn of(job: &JobRef) -> Self {
        Self(Arc::as_ptr(job) as *const () as usize)
    }
}
