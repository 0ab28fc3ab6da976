// tests/property_scheduler.rs

use std::sync::Arc;

use jobsystem::JobSystem;
use jobsystem_test_utils::jobs::{ExecutionLog, TracedJob, job_ref};
use proptest::prelude::*;

/// Dependency lists for `n` jobs. Job `i` may only depend on jobs `0..i`,
/// which keeps the graph acyclic. Repeats are kept on purpose.
fn dag_strategy(max_jobs: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_jobs).prop_flat_map(|num_jobs| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), num_jobs)
            .prop_map(|raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, deps)| {
                        if i == 0 {
                            Vec::new()
                        } else {
                            deps.into_iter().map(|d| d % i).collect()
                        }
                    })
                    .collect()
            })
    })
}

fn build_jobs(log: &Arc<ExecutionLog>, deps: &[Vec<usize>]) -> Vec<Arc<TracedJob>> {
    let jobs: Vec<_> = (0..deps.len())
        .map(|i| TracedJob::new(&format!("job_{i}"), log))
        .collect();
    for (i, list) in deps.iter().enumerate() {
        for &d in list {
            jobs[i].depends_on(&jobs[d]);
        }
    }
    jobs
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_acyclic_graphs_run_each_job_once_in_order(
        deps in dag_strategy(24),
        workers in 1..5usize,
        root_mask in any::<u32>(),
    ) {
        let log = ExecutionLog::new();
        let jobs = build_jobs(&log, &deps);
        let system = JobSystem::new(workers).unwrap();

        // The last job is always a root; others only if their mask bit is set.
        system.add(&job_ref(jobs.last().unwrap()));
        for (i, job) in jobs.iter().enumerate() {
            if root_mask & (1 << (i % 32)) != 0 {
                system.add(&job_ref(job));
            }
        }

        prop_assert!(system.execute(None));

        for (i, list) in deps.iter().enumerate() {
            let name = format!("job_{i}");
            let starts = log.starts(&name);
            prop_assert!(starts <= 1, "{} ran {} times", name, starts);
            if starts == 1 {
                for &d in list {
                    let dep = format!("job_{d}");
                    prop_assert_eq!(log.starts(&dep), 1);
                    prop_assert!(log.finished_before(&dep, &name), "{} ran before {}", name, dep);
                }
            }
        }
        prop_assert_eq!(log.starts(&format!("job_{}", jobs.len() - 1)), 1);

        for job in &jobs {
            job.clear_dependencies();
        }
    }

    #[test]
    fn test_back_edge_fails_without_running_anything(
        deps in dag_strategy(16),
        workers in 1..5usize,
        pick in any::<usize>(),
    ) {
        let log = ExecutionLog::new();
        let jobs = build_jobs(&log, &deps);
        let system = JobSystem::new(workers).unwrap();
        for job in &jobs {
            system.add(&job_ref(job));
        }

        // Chain every job onto its predecessor so the last job transitively
        // depends on all others, then make `target` wait on the last job.
        // For `target == last` that is a self-edge.
        for i in 1..jobs.len() {
            jobs[i].depends_on(&jobs[i - 1]);
        }
        let last = jobs.len() - 1;
        let target = pick % jobs.len();
        jobs[target].depends_on(&jobs[last]);

        prop_assert!(!system.execute(None));
        prop_assert!(log.events().is_empty());

        for job in &jobs {
            job.clear_dependencies();
        }
    }
}
