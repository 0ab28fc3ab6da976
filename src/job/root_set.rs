// src/job/root_set.rs

//! Cycle-persistent registry of root jobs.

use std::sync::{Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::trace;

use crate::job::{JobKey, JobRef};

/// Narrow registration surface handed to subsystems that only need to
/// register and unregister their jobs.
pub trait JobSet: Send + Sync {
    /// Register `job`. Registering an already present job is a no-op.
    fn add(&self, job: &JobRef);

    /// Unregister `job`. Removing an absent job is a no-op.
    fn remove(&self, job: &JobRef);
}

/// Thread-safe set of root jobs, kept in insertion order.
///
/// Membership is by job identity, so the same job is never present twice.
/// Insert and lookup are constant time.
#[derive(Default)]
pub struct RootSet {
    jobs: Mutex<IndexMap<JobKey, JobRef>>,
}

impl RootSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `job` unless it is already registered.
    ///
    /// Returns `true` if the job was newly inserted.
    pub fn insert(&self, job: &JobRef) -> bool {
        let mut jobs = self.lock();
        if jobs.contains_key(&JobKey::of(job)) {
            trace!(job = %job.name(), "root already registered; ignoring");
            return false;
        }
        jobs.insert(JobKey::of(job), job.clone());
        trace!(job = %job.name(), roots = jobs.len(), "root registered");
        true
    }

    /// Remove `job` if registered.
    ///
    /// Returns `true` if the job was present.
    pub fn take(&self, job: &JobRef) -> bool {
        let mut jobs = self.lock();
        // shift_remove keeps the remaining roots in insertion order.
        match jobs.shift_remove(&JobKey::of(job)) {
            Some(_) => {
                trace!(job = %job.name(), roots = jobs.len(), "root unregistered");
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, job: &JobRef) -> bool {
        self.lock().contains_key(&JobKey::of(job))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop every registered root.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Copy of the current membership, in insertion order.
    ///
    /// A cycle works from this copy, so later `add`/`remove` calls only take
    /// effect on the next cycle.
    pub fn snapshot(&self) -> Vec<JobRef> {
        self.lock().values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, IndexMap<JobKey, JobRef>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl JobSet for RootSet {
    fn add(&self, job: &JobRef) {
        self.insert(job);
    }

    fn remove(&self, job: &JobRef) {
        self.take(job);
    }
}

impl std::fmt::Debug for RootSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.lock().values().map(|j| j.name().into_owned()).collect();
        f.debug_struct("RootSet").field("jobs", &names).finish()
    }
}
