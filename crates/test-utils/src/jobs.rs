//! Reusable job implementations for scheduler tests.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use jobsystem::{DependencySink, Job, JobRef};

/// Counts its executions; reports whatever dependencies it was given,
/// duplicates included.
pub struct CounterJob {
    name: String,
    count: AtomicUsize,
    deps: Mutex<Vec<JobRef>>,
}

impl CounterJob {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            count: AtomicUsize::new(0),
            deps: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Add a dependency edge. Adding the same job twice makes it be
    /// reported twice.
    pub fn add_dependency(&self, dep: JobRef) {
        self.deps.lock().unwrap().push(dep);
    }

    pub fn clear_dependencies(&self) {
        self.deps.lock().unwrap().clear();
    }
}

impl Job for CounterJob {
    fn execute(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn collect_dependencies(&self, sink: &mut DependencySink<'_>) {
        let deps = self.deps.lock().unwrap().clone();
        sink.report_all(deps);
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// `value = base + sum(inputs)`, evaluated at execution time.
pub struct SumJob {
    name: String,
    base: u64,
    inputs: Mutex<Vec<Arc<SumJob>>>,
    value: AtomicU64,
    runs: AtomicUsize,
}

impl SumJob {
    pub fn new(name: &str, base: u64) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            base,
            inputs: Mutex::new(Vec::new()),
            value: AtomicU64::new(0),
            runs: AtomicUsize::new(0),
        })
    }

    pub fn value(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }

    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn add_input(&self, input: &Arc<SumJob>) {
        self.inputs.lock().unwrap().push(input.clone());
    }

    /// Remove every edge to `input`.
    pub fn remove_input(&self, input: &Arc<SumJob>) {
        self.inputs
            .lock()
            .unwrap()
            .retain(|i| !Arc::ptr_eq(i, input));
    }

    pub fn clear_inputs(&self) {
        self.inputs.lock().unwrap().clear();
    }
}

impl Job for SumJob {
    fn execute(&self) {
        let inputs = self.inputs.lock().unwrap().clone();
        let sum: u64 = inputs.iter().map(|i| i.value()).sum();
        self.value.store(self.base + sum, Ordering::Release);
        self.runs.fetch_add(1, Ordering::SeqCst);
    }

    fn collect_dependencies(&self, sink: &mut DependencySink<'_>) {
        for input in self.inputs.lock().unwrap().iter() {
            sink.report(input.clone());
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// Build a binomial-sum tree of the given depth and return its root.
///
/// Level `depth` holds `depth + 1` leaves of value 1; node `i` of level `k`
/// sums nodes `i` and `i + 1` of level `k + 1`. Inner nodes are shared
/// between parents, and the root evaluates to `2^depth`.
pub fn binomial_tree(depth: usize) -> Arc<SumJob> {
    let mut level: Vec<Arc<SumJob>> = (0..=depth)
        .map(|i| SumJob::new(&format!("leaf_{i}"), 1))
        .collect();

    for k in (0..depth).rev() {
        level = (0..=k)
            .map(|i| {
                let node = SumJob::new(&format!("sum_{k}_{i}"), 0);
                node.add_input(&level[i]);
                node.add_input(&level[i + 1]);
                node
            })
            .collect();
    }

    level.remove(0)
}

/// What a [`TracedJob`] recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(String),
    End(String),
}

/// Shared, ordered record of job starts and ends.
#[derive(Debug, Default)]
pub struct ExecutionLog {
    events: Mutex<Vec<Event>>,
}

impl ExecutionLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// How many times `name` started.
    pub fn starts(&self, name: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Start(n) if n == name))
            .count()
    }

    /// Whether `first` ended before `second` started.
    pub fn finished_before(&self, first: &str, second: &str) -> bool {
        let events = self.events();
        let end = events
            .iter()
            .position(|e| matches!(e, Event::End(n) if n == first));
        let start = events
            .iter()
            .position(|e| matches!(e, Event::Start(n) if n == second));
        match (end, start) {
            (Some(end), Some(start)) => end < start,
            _ => false,
        }
    }

    /// Largest number of jobs that were running at the same time.
    pub fn max_concurrency(&self) -> usize {
        let mut running = 0usize;
        let mut max = 0usize;
        for event in self.events() {
            match event {
                Event::Start(_) => {
                    running += 1;
                    max = max.max(running);
                }
                Event::End(_) => running -= 1,
            }
        }
        max
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

/// Records its start and end into an [`ExecutionLog`], optionally sleeping
/// in between.
pub struct TracedJob {
    name: String,
    log: Arc<ExecutionLog>,
    work: Duration,
    deps: Mutex<Vec<Arc<TracedJob>>>,
}

impl TracedJob {
    pub fn new(name: &str, log: &Arc<ExecutionLog>) -> Arc<Self> {
        Self::with_work(name, log, Duration::ZERO)
    }

    pub fn with_work(name: &str, log: &Arc<ExecutionLog>, work: Duration) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            log: Arc::clone(log),
            work,
            deps: Mutex::new(Vec::new()),
        })
    }

    pub fn depends_on(&self, dep: &Arc<TracedJob>) {
        self.deps.lock().unwrap().push(dep.clone());
    }

    pub fn clear_dependencies(&self) {
        self.deps.lock().unwrap().clear();
    }
}

impl Job for TracedJob {
    fn execute(&self) {
        self.log.push(Event::Start(self.name.clone()));
        if !self.work.is_zero() {
            std::thread::sleep(self.work);
        }
        self.log.push(Event::End(self.name.clone()));
    }

    fn collect_dependencies(&self, sink: &mut DependencySink<'_>) {
        for dep in self.deps.lock().unwrap().iter() {
            sink.report(dep.clone());
        }
    }

    fn name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

/// Upcast helper for registering concrete jobs.
pub fn job_ref<J: Job + 'static>(job: &Arc<J>) -> JobRef {
    job.clone()
}
