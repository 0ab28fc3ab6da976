// src/config/validate.rs

use crate::config::model::{GraphFile, RawGraphFile};
use crate::errors::{JobSystemError, Result};

impl TryFrom<RawGraphFile> for GraphFile {
    type Error = JobSystemError;

    fn try_from(raw: RawGraphFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_graph(&raw)?;
        Ok(GraphFile::new_unchecked(raw.system, raw.run, raw.job))
    }
}

fn validate_raw_graph(cfg: &RawGraphFile) -> Result<()> {
    ensure_has_jobs(cfg)?;
    validate_system(cfg)?;
    validate_run(cfg)?;
    validate_job_dependencies(cfg)?;
    Ok(())
}

fn ensure_has_jobs(cfg: &RawGraphFile) -> Result<()> {
    if cfg.job.is_empty() {
        return Err(JobSystemError::ConfigError(
            "graph must contain at least one [job.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_system(cfg: &RawGraphFile) -> Result<()> {
    if cfg.system.workers == Some(0) {
        return Err(JobSystemError::ConfigError(
            "[system].workers must be >= 1 (got 0); omit it to use all cores".to_string(),
        ));
    }
    Ok(())
}

fn validate_run(cfg: &RawGraphFile) -> Result<()> {
    if cfg.run.cycles == 0 {
        return Err(JobSystemError::ConfigError(
            "[run].cycles must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Every `after` entry must name a job in the file.
///
/// Self references and cycles are left for the scheduler to report.
fn validate_job_dependencies(cfg: &RawGraphFile) -> Result<()> {
    for (name, job) in cfg.job.iter() {
        for dep in job.after.iter() {
            if !cfg.job.contains_key(dep) {
                return Err(JobSystemError::ConfigError(format!(
                    "job '{}' has unknown dependency '{}' in `after`",
                    name, dep
                )));
            }
        }
    }
    Ok(())
}
