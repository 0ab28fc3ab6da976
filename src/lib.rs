// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod graph;
pub mod job;
pub mod logging;
pub mod system;
pub mod workload;

use anyhow::{Context, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{GraphFile, load_and_validate};
use crate::errors::Result;
use crate::workload::Workload;

pub use errors::JobSystemError;
pub use graph::CycleError;
pub use job::{DependencySink, Job, JobRef, JobSet, RootSet};
pub use logging::{LogLevel, Logger, TracingLogger};
pub use system::{CycleReport, CycleState, JobSystem, SystemOptions};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - graph file loading (plus CLI overrides)
/// - job instantiation and root registration
/// - the job system, run for the requested number of cycles
pub fn run(args: CliArgs) -> anyhow::Result<()> {
    let mut graph = load_and_validate(&args.config)
        .with_context(|| format!("failed to load job graph from '{}'", args.config.display()))?;

    if let Some(workers) = args.workers {
        graph.system.workers = Some(workers);
    }
    if let Some(cycles) = args.cycles {
        if cycles == 0 {
            bail!("--cycles must be >= 1");
        }
        graph.run.cycles = cycles;
    }

    if args.dry_run {
        print_dry_run(&graph);
        return Ok(());
    }

    let workload = run_graph(&graph)?;
    print_totals(&workload);
    Ok(())
}

/// Build the jobs described by `graph` and execute `graph.run.cycles` cycles.
///
/// Stops at the first failed cycle.
pub fn run_graph(graph: &GraphFile) -> Result<Workload> {
    let system = JobSystem::with_options(graph.system.clone())?;
    let workload = Workload::from_graph(graph);
    workload.register_roots(graph, &system);

    info!(
        jobs = graph.job.len(),
        roots = system.root_count(),
        workers = system.worker_count(),
        cycles = graph.run.cycles,
        "starting job graph"
    );

    for cycle in 1..=graph.run.cycles {
        let report = system.try_execute()?;
        info!(
            cycle,
            jobs = report.jobs,
            edges = report.edges,
            elapsed_us = report.elapsed.as_micros() as u64,
            "cycle finished"
        );
    }

    Ok(workload)
}

fn print_totals(workload: &Workload) {
    println!("job totals:");
    for (name, job) in workload.iter() {
        println!("  {name}: total = {} (runs = {})", job.total(), job.runs());
    }
}

/// Simple dry-run output: print options, jobs and dependencies.
fn print_dry_run(graph: &GraphFile) {
    println!("jobsystem dry-run");
    match graph.system.workers {
        Some(n) => println!("  system.workers = {n}"),
        None => println!(
            "  system.workers = auto ({})",
            system::options::available_workers()
        ),
    }
    println!("  system.thread_name = {}", graph.system.thread_name);
    println!("  run.cycles = {}", graph.run.cycles);
    println!();

    println!("jobs ({}):", graph.job.len());
    for (name, job) in graph.job.iter() {
        println!("  - {name}");
        println!("      value: {}", job.value);
        if job.work_ms > 0 {
            println!("      work_ms: {}", job.work_ms);
        }
        if !job.after.is_empty() {
            println!("      after: {:?}", job.after);
        }
        if !job.root {
            println!("      root: false");
        }
    }

    debug!("dry-run complete (no execution)");
}
