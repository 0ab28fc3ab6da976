// tests/graph_file.rs

use std::io::Write;

use jobsystem::config::{load_and_validate, parse_str};
use jobsystem::errors::JobSystemError;
use jobsystem::run_graph;
use jobsystem_test_utils::builders::{GraphFileBuilder, JobConfigBuilder};
use jobsystem_test_utils::init_tracing;
use tempfile::NamedTempFile;

#[test]
fn test_load_graph_with_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[system]
workers = 3

[job.load]
value = 2

[job.build]
work_ms = 1
after = ["load", "load"]
root = false

[job.publish]
after = ["build"]
"#
    )
    .unwrap();

    let graph = load_and_validate(file.path()).unwrap();
    assert_eq!(graph.system.workers, Some(3));
    assert_eq!(graph.system.thread_name, "jobsystem-worker");
    assert_eq!(graph.run.cycles, 1);
    assert_eq!(graph.job["build"].value, 1);
    assert_eq!(graph.job["build"].after, vec!["load", "load"]);
    assert!(!graph.job["build"].root);

    let roots: Vec<&str> = graph.root_names().collect();
    assert_eq!(roots, vec!["load", "publish"]);
}

#[test]
fn test_unknown_dependency_returns_config_error() {
    let raw = parse_str(
        r#"
[job.A]
after = ["NonExistent"]
"#,
    )
    .unwrap();

    match jobsystem::config::GraphFile::try_from(raw) {
        Err(JobSystemError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_empty_graph_and_zero_values_are_rejected() {
    let empty = GraphFileBuilder::new().raw();
    assert!(matches!(
        jobsystem::config::GraphFile::try_from(empty),
        Err(JobSystemError::ConfigError(_))
    ));

    let zero_workers = GraphFileBuilder::new()
        .with_job("A", JobConfigBuilder::new(1).build())
        .with_workers(0)
        .raw();
    assert!(matches!(
        jobsystem::config::GraphFile::try_from(zero_workers),
        Err(JobSystemError::ConfigError(msg)) if msg.contains("workers")
    ));

    let zero_cycles = GraphFileBuilder::new()
        .with_job("A", JobConfigBuilder::new(1).build())
        .with_cycles(0)
        .raw();
    assert!(matches!(
        jobsystem::config::GraphFile::try_from(zero_cycles),
        Err(JobSystemError::ConfigError(msg)) if msg.contains("cycles")
    ));
}

#[test]
fn test_invalid_toml_returns_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[job.A\nvalue = ").unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(JobSystemError::TomlError(_))
    ));
}

#[test]
fn test_run_graph_aggregates_totals() {
    init_tracing();
    for workers in [1, 4] {
        let graph = GraphFileBuilder::new()
            .with_workers(workers)
            .with_cycles(3)
            .with_job("a", JobConfigBuilder::new(1).build())
            .with_job("b", JobConfigBuilder::new(10).after("a").after("a").build())
            .with_job("c", JobConfigBuilder::new(100).after("a").work_ms(1).build())
            .with_job(
                "d",
                JobConfigBuilder::new(1000).after("b").after("c").root(false).build(),
            )
            .with_job("top", JobConfigBuilder::new(0).after("d").build())
            .build();

        let workload = run_graph(&graph).unwrap();
        let total = |name: &str| workload.get(name).unwrap().total();
        let runs = |name: &str| workload.get(name).unwrap().runs();

        assert_eq!(total("a"), 1);
        assert_eq!(total("b"), 11, "repeated `after` entries count once");
        assert_eq!(total("c"), 101);
        assert_eq!(total("d"), 1112);
        assert_eq!(total("top"), 1112);
        for name in ["a", "b", "c", "d", "top"] {
            assert_eq!(runs(name), 3, "{name} runs once per cycle");
        }
    }
}

#[test]
fn test_run_graph_reports_cycle() {
    init_tracing();
    let graph = GraphFileBuilder::new()
        .with_workers(2)
        .with_job("x", JobConfigBuilder::new(1).after("y").build())
        .with_job("y", JobConfigBuilder::new(1).after("x").build())
        .with_job("z", JobConfigBuilder::new(1).build())
        .build();

    match run_graph(&graph) {
        Err(JobSystemError::CycleDetected(cycle)) => {
            assert_eq!(cycle.cycles, vec![vec!["x".to_string(), "y".to_string()]]);
        }
        other => panic!("Expected CycleDetected, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_cli_defaults_to_jobs_toml() {
    use clap::Parser;
    use jobsystem::cli::CliArgs;
    use jobsystem::config::default_config_path;

    let args = CliArgs::try_parse_from(["jobsystem"]).unwrap();
    assert_eq!(args.config, default_config_path());
    assert_eq!(args.config, std::path::PathBuf::from("Jobs.toml"));
    assert!(args.cycles.is_none() && !args.dry_run);

    let args = CliArgs::try_parse_from(["jobsystem", "--config", "other.toml", "--workers", "3"])
        .unwrap();
    assert_eq!(args.config, std::path::PathBuf::from("other.toml"));
    assert_eq!(args.workers, Some(3));
}
