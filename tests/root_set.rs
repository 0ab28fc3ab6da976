// tests/root_set.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, Weak};

use jobsystem::{DependencySink, Job, JobRef, JobSet, JobSystem, RootSet};
use jobsystem_test_utils::init_tracing;
use jobsystem_test_utils::jobs::{CounterJob, job_ref};

/// Registers and unregisters roots of its own system from inside `execute`.
struct RegistrarJob {
    system: OnceLock<Weak<JobSystem>>,
    to_add: Vec<JobRef>,
    to_remove: Mutex<Vec<Weak<dyn Job>>>,
    runs: AtomicUsize,
}

impl RegistrarJob {
    fn new(system: &Arc<JobSystem>, to_add: Vec<JobRef>) -> Arc<Self> {
        let job = Arc::new(Self {
            system: OnceLock::new(),
            to_add,
            to_remove: Mutex::new(Vec::new()),
            runs: AtomicUsize::new(0),
        });
        job.system.set(Arc::downgrade(system)).unwrap();
        job
    }

    fn remove_on_run(&self, job: &JobRef) {
        self.to_remove.lock().unwrap().push(Arc::downgrade(job));
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

impl Job for RegistrarJob {
    fn execute(&self) {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let Some(system) = self.system.get().and_then(Weak::upgrade) else {
            return;
        };
        for job in &self.to_add {
            system.add(job);
        }
        for job in self.to_remove.lock().unwrap().iter().filter_map(Weak::upgrade) {
            system.remove(&job);
        }
    }

    fn collect_dependencies(&self, _sink: &mut DependencySink<'_>) {}
}

#[test]
fn test_add_is_idempotent() {
    init_tracing();
    let system = JobSystem::new(1).unwrap();
    let a = CounterJob::new("A");

    system.add(&job_ref(&a));
    system.add(&job_ref(&a));
    system.add(&job_ref(&a));
    assert_eq!(system.root_count(), 1);

    assert!(system.execute(None));
    assert_eq!(a.count(), 1, "a job added three times still runs once");
}

#[test]
fn test_remove_unregistered_is_noop() {
    init_tracing();
    let system = JobSystem::new(1).unwrap();
    let a = CounterJob::new("A");
    let b = CounterJob::new("B");
    system.add(&job_ref(&a));

    system.remove(&job_ref(&b));
    system.remove(&job_ref(&b));
    assert_eq!(system.root_count(), 1);

    system.remove(&job_ref(&a));
    system.remove(&job_ref(&a));
    assert_eq!(system.root_count(), 0);

    assert!(system.execute(None), "an empty root set is a valid, empty cycle");
    assert_eq!(a.count(), 0);
    assert_eq!(b.count(), 0);
}

#[test]
fn test_independent_counters_with_churn() {
    init_tracing();
    let system = JobSystem::new(1).unwrap();
    let a = CounterJob::new("A");
    let b = CounterJob::new("B");
    let c = CounterJob::new("C");
    let jobs: Vec<JobRef> = vec![job_ref(&a), job_ref(&b), job_ref(&c)];

    for job in &jobs {
        system.add(job);
    }

    for round in 1..=10 {
        assert!(system.execute(None));
        assert_eq!(a.count(), round);
        assert_eq!(b.count(), round);
        assert_eq!(c.count(), round);

        // Churn between cycles: remove and re-add, add duplicates.
        system.remove(&jobs[round % 3]);
        system.add(&jobs[round % 3]);
        system.add(&jobs[(round + 1) % 3]);
    }
}

#[test]
fn test_removed_root_stops_running_but_dependency_still_runs() {
    init_tracing();
    let system = JobSystem::new(1).unwrap();
    let a = CounterJob::new("A");
    let b = CounterJob::new("B");
    a.add_dependency(job_ref(&b));

    system.add(&job_ref(&a));
    system.add(&job_ref(&b));
    assert!(system.execute(None));
    assert_eq!((a.count(), b.count()), (1, 1));

    // B is no longer a root, but A still reports it.
    system.remove(&job_ref(&b));
    assert!(system.execute(None));
    assert_eq!((a.count(), b.count()), (2, 2));

    system.remove(&job_ref(&a));
    assert!(system.execute(None));
    assert_eq!((a.count(), b.count()), (2, 2));
}

#[test]
fn test_root_set_through_job_set_trait() {
    let roots = RootSet::new();
    let a = CounterJob::new("A");
    let set: &dyn JobSet = &roots;

    set.add(&job_ref(&a));
    set.add(&job_ref(&a));
    assert_eq!(roots.len(), 1);
    assert!(roots.contains(&job_ref(&a)));

    let snapshot = roots.snapshot();
    set.remove(&job_ref(&a));
    assert!(roots.is_empty());
    assert_eq!(snapshot.len(), 1, "snapshots are unaffected by later removals");
}

#[test]
fn test_concurrent_add_remove() {
    init_tracing();
    let system = JobSystem::new(2).unwrap();
    let jobs: Vec<_> = (0..16).map(|i| CounterJob::new(&format!("job_{i}"))).collect();

    std::thread::scope(|s| {
        for chunk in jobs.chunks(4) {
            let system = &system;
            s.spawn(move || {
                for _ in 0..50 {
                    for job in chunk {
                        system.add(&job_ref(job));
                    }
                    for job in chunk {
                        system.remove(&job_ref(job));
                    }
                    for job in chunk {
                        system.add(&job_ref(job));
                    }
                }
            });
        }
    });

    assert_eq!(system.root_count(), 16);
    assert!(system.execute(None));
    assert!(jobs.iter().all(|j| j.count() == 1));
}

#[test]
fn test_add_during_execute_takes_effect_next_cycle() {
    init_tracing();
    for workers in [1, 4] {
        let system = Arc::new(JobSystem::new(workers).unwrap());
        let other = CounterJob::new("other");
        let registrar = RegistrarJob::new(&system, vec![job_ref(&other)]);
        system.add(&job_ref(&registrar));

        assert!(system.execute(None));
        assert_eq!(registrar.runs(), 1);
        assert_eq!(other.count(), 0, "added mid-cycle, so not part of this cycle");
        assert!(system.contains(&job_ref(&other)));

        assert!(system.execute(None));
        assert_eq!(registrar.runs(), 2);
        assert_eq!(other.count(), 1, "runs from the next cycle on");
    }
}

#[test]
fn test_remove_self_during_execute_takes_effect_next_cycle() {
    init_tracing();
    for workers in [1, 4] {
        let system = Arc::new(JobSystem::new(workers).unwrap());
        let bystander = CounterJob::new("bystander");
        let registrar = RegistrarJob::new(&system, Vec::new());
        let registrar_ref = job_ref(&registrar);
        registrar.remove_on_run(&registrar_ref);
        registrar.remove_on_run(&job_ref(&bystander));
        system.add(&registrar_ref);
        system.add(&job_ref(&bystander));

        assert!(system.execute(None));
        assert_eq!(registrar.runs(), 1);
        assert_eq!(bystander.count(), 1, "already collected when it was removed");
        assert_eq!(system.root_count(), 0);

        assert!(system.execute(None));
        assert_eq!(registrar.runs(), 1);
        assert_eq!(bystander.count(), 1);
    }
}

#[test]
fn test_snapshot_keeps_insertion_order_after_removal() {
    let roots = RootSet::new();
    let jobs: Vec<_> = ["a", "b", "c", "d"].iter().map(|n| CounterJob::new(n)).collect();
    for job in &jobs {
        roots.insert(&job_ref(job));
    }

    assert!(roots.take(&job_ref(&jobs[1])));
    assert!(!roots.take(&job_ref(&jobs[1])));
    assert!(roots.insert(&job_ref(&jobs[1])));

    let names: Vec<String> = roots.snapshot().iter().map(|j| j.name().into_owned()).collect();
    assert_eq!(names, vec!["a", "c", "d", "b"]);
}
