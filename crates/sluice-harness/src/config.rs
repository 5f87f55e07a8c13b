//! Worker harness configuration.
//!
//! Configuration is loaded and validated before the harness starts; the
//! core never re-reads the environment while running.

use std::time::Duration;

use sluice_core::{JobId, ProjectId, WorkerId};

use crate::error::{Error, Result};

/// Default lease duration requested from the coordinator.
pub const DEFAULT_LEASE_DURATION: Duration = Duration::from_secs(300);

/// Environment variable naming the project/namespace.
pub const ENV_PROJECT_ID: &str = "SLUICE_PROJECT_ID";

/// Environment variable naming the job.
pub const ENV_JOB_ID: &str = "SLUICE_JOB_ID";

/// Environment variable naming this worker. Generated when absent.
pub const ENV_WORKER_ID: &str = "SLUICE_WORKER_ID";

/// Environment variable overriding the worker thread count.
pub const ENV_WORKER_THREADS: &str = "SLUICE_WORKER_THREADS";

/// Environment variable overriding the requested lease duration (seconds).
pub const ENV_LEASE_DURATION_SECS: &str = "SLUICE_LEASE_DURATION_SECS";

/// Static configuration of one worker harness process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Project/namespace owning the job.
    pub project_id: ProjectId,
    /// Job this worker participates in.
    pub job_id: JobId,
    /// Identity of this worker process.
    pub worker_id: WorkerId,
    /// Explicit worker thread count; when absent or non-positive the
    /// harness falls back to the host's available parallelism.
    pub worker_threads: Option<usize>,
    /// Lease duration requested from the coordinator.
    pub requested_lease_duration: Duration,
}

impl WorkerConfig {
    /// Creates a configuration with default pool sizing and lease duration.
    #[must_use]
    pub fn new(project_id: ProjectId, job_id: JobId, worker_id: WorkerId) -> Self {
        Self {
            project_id,
            job_id,
            worker_id,
            worker_threads: None,
            requested_lease_duration: DEFAULT_LEASE_DURATION,
        }
    }

    /// Sets an explicit worker thread count.
    #[must_use]
    pub const fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = Some(worker_threads);
        self
    }

    /// Sets the lease duration requested from the coordinator.
    #[must_use]
    pub const fn with_lease_duration(mut self, duration: Duration) -> Self {
        self.requested_lease_duration = duration;
        self
    }

    /// Resolves the number of worker loops to run.
    ///
    /// The explicit configuration wins when present and positive; otherwise
    /// the host's available parallelism is used, minimum 1.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        match self.worker_threads {
            Some(count) if count > 0 => count,
            _ => std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        }
    }

    /// Loads the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a required variable is missing or a
    /// numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        let project_id = ProjectId::new(required_env(ENV_PROJECT_ID)?)?;
        let job_id = JobId::new(required_env(ENV_JOB_ID)?)?;
        let worker_id = match optional_env(ENV_WORKER_ID) {
            Some(id) => WorkerId::new(id)?,
            None => WorkerId::generate(),
        };

        let mut config = Self::new(project_id, job_id, worker_id);

        if let Some(threads) = optional_env(ENV_WORKER_THREADS) {
            let threads = threads.parse::<usize>().map_err(|_| {
                Error::configuration(format!("invalid {ENV_WORKER_THREADS}: {threads}"))
            })?;
            config.worker_threads = Some(threads);
        }

        if let Some(secs) = optional_env(ENV_LEASE_DURATION_SECS) {
            let secs = secs.parse::<u64>().map_err(|_| {
                Error::configuration(format!("invalid {ENV_LEASE_DURATION_SECS}: {secs}"))
            })?;
            config.requested_lease_duration = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| Error::configuration(format!("missing {key}")))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
