// src/system/options.rs

use serde::Deserialize;

/// Construction options for a [`JobSystem`](crate::JobSystem).
///
/// Also used as the `[system]` section of a graph file:
///
/// ```toml
/// [system]
/// workers = 4
/// thread_name = "render-worker"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemOptions {
    /// Worker thread count. `None` uses the machine's available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Prefix for worker thread names; threads are named `<prefix>-<index>`.
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

fn default_thread_name() -> String {
    "jobsystem-worker".to_string()
}

impl Default for SystemOptions {
    fn default() -> Self {
        Self {
            workers: None,
            thread_name: default_thread_name(),
        }
    }
}

impl SystemOptions {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: Some(workers),
            ..Self::default()
        }
    }

    /// Worker count to start, before clamping.
    pub fn resolved_workers(&self) -> usize {
        match self.workers {
            Some(n) => n,
            None => available_workers(),
        }
    }
}

/// Number of hardware threads, or 1 if it cannot be determined.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
