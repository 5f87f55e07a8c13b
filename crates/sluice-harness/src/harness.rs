//! Worker pool controller.
//!
//! Owns the lifecycle of the worker loops: resolves the pool size, spawns
//! one loop per slot with its own independent backoff state, and runs
//! until every loop has stopped. In steady-state operation this is the
//! lifetime of the process.

use std::sync::Arc;

use tokio::task::JoinSet;

use sluice_core::LogContext;

use crate::backoff::ExponentialBackoff;
use crate::client::CoordinatorWorkClient;
use crate::config::WorkerConfig;
use crate::error::{Error, Result};
use crate::lease::LeaseService;
use crate::metrics::HarnessMetrics;
use crate::sleeper::Sleeper;
use crate::worker::{WorkProcessor, run_worker_loop};

/// The worker harness: pool controller plus the process-lifetime
/// diagnostic context.
#[derive(Debug)]
pub struct WorkerHarness {
    config: WorkerConfig,
    context: LogContext,
    metrics: HarnessMetrics,
}

impl WorkerHarness {
    /// Creates a harness, recording the job and worker identifiers into a
    /// fresh diagnostic context.
    #[must_use]
    pub fn new(config: WorkerConfig) -> Self {
        let context = LogContext::new(config.job_id.clone(), config.worker_id.clone());
        tracing::info!(
            job_id = %context.job_id(),
            worker_id = %context.worker_id(),
            project_id = %config.project_id,
            "worker harness created"
        );
        Self {
            config,
            context,
            metrics: HarnessMetrics::new(),
        }
    }

    /// Returns the harness configuration.
    #[must_use]
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Returns the diagnostic context shared with the lease client.
    #[must_use]
    pub fn context(&self) -> &LogContext {
        &self.context
    }

    /// Builds a lease client bound to this harness's configuration and
    /// diagnostic context.
    #[must_use]
    pub fn work_unit_client<S: LeaseService>(
        &self,
        service: Arc<S>,
    ) -> CoordinatorWorkClient<S> {
        CoordinatorWorkClient::new(service, self.config.clone(), self.context.clone())
    }

    /// Runs the worker pool until shutdown.
    ///
    /// Spawns one worker loop per resolved slot, each with its own backoff
    /// state, all sharing `processor` and `sleeper`. Returns when every
    /// loop has stopped (each loop stops when its sleep is interrupted).
    ///
    /// # Errors
    ///
    /// Returns the first fatal error raised by any loop; the remaining
    /// loops are aborted at their next suspension point.
    pub async fn process_work<P, S>(&self, processor: Arc<P>, sleeper: Arc<S>) -> Result<()>
    where
        P: WorkProcessor + ?Sized + 'static,
        S: Sleeper + ?Sized + 'static,
    {
        let worker_count = self.config.worker_count();
        tracing::info!(
            job_id = %self.context.job_id(),
            worker_id = %self.context.worker_id(),
            worker_count,
            "starting worker pool"
        );
        self.metrics.set_active_workers(worker_count);

        let mut pool = JoinSet::new();
        for slot in 0..worker_count {
            let backoff = ExponentialBackoff::default();
            pool.spawn(run_worker_loop(
                slot,
                Arc::clone(&processor),
                Arc::clone(&sleeper),
                backoff,
                self.metrics,
            ));
        }

        let mut first_error = None;
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        pool.abort_all();
                        first_error = Some(error);
                    }
                }
                Err(join_error) if join_error.is_cancelled() => {}
                Err(join_error) => {
                    if first_error.is_none() {
                        first_error =
                            Some(Error::internal(format!("worker loop panicked: {join_error}")));
                    }
                }
            }
        }

        self.metrics.set_active_workers(0);
        tracing::info!(worker_id = %self.context.worker_id(), "worker pool stopped");

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_core::{JobId, ProjectId, WorkerId};

    fn harness() -> WorkerHarness {
        WorkerHarness::new(WorkerConfig::new(
            ProjectId::new_unchecked("test-project"),
            JobId::new_unchecked("test-job"),
            WorkerId::new_unchecked("test-worker"),
        ))
    }

    #[test]
    fn creation_records_job_and_worker_in_the_context() {
        let harness = harness();
        assert_eq!(harness.context().job_id().as_str(), "test-job");
        assert_eq!(harness.context().worker_id().as_str(), "test-worker");
        assert!(harness.context().work_id().is_none());
    }

    #[test]
    fn client_shares_the_harness_context() {
        use crate::lease::InMemoryLeaseService;

        let harness = harness();
        let _client = harness.work_unit_client(Arc::new(InMemoryLeaseService::new()));
        // Context remains harness-owned; the client holds a clone of the
        // same shared state.
        assert_eq!(harness.context().job_id().as_str(), "test-job");
    }
}
