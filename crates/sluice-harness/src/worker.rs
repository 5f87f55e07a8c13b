//! Per-slot worker loop and the execution capability it drives.
//!
//! Each worker slot runs one loop: attempt a unit of work, reset backoff
//! and go again on success, back off and retry on an empty or failed
//! attempt. Empty leases and transport failures are absorbed here
//! indefinitely; a protocol violation is returned out of the loop so the
//! pool supervisor sees it.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backoff::ExponentialBackoff;
use crate::client::WorkUnitClient;
use crate::error::Result;
use crate::lease::WorkUnit;
use crate::metrics::HarnessMetrics;
use crate::sleeper::{SleepOutcome, Sleeper};

/// Attempt-outcome label values for the lease-attempt counter.
mod outcome {
    pub const WORK_FOUND: &str = "work_found";
    pub const NO_WORK: &str = "no_work";
    pub const TRANSPORT_ERROR: &str = "transport_error";
    pub const PROTOCOL_ERROR: &str = "protocol_error";
}

/// The execution capability driven by each worker loop.
///
/// One call leases and executes at most one unit of work.
#[async_trait]
pub trait WorkProcessor: Send + Sync {
    /// Leases and executes at most one unit of work.
    ///
    /// Returns `Ok(true)` when a unit was leased and executed, `Ok(false)`
    /// when no unit was available or execution could not proceed this
    /// attempt.
    ///
    /// # Errors
    ///
    /// Returns a transport error when the lease exchange failed (the loop
    /// retries with backoff) or a protocol error when the coordinator
    /// response was invalid (fatal for the pool).
    async fn get_and_perform_work(&self) -> Result<bool>;
}

/// Downstream execution of one leased work unit.
///
/// The stage-evaluation logic behind this trait is outside the harness;
/// the harness only needs to know whether the unit was processed.
#[async_trait]
pub trait UnitExecutor: Send + Sync {
    /// Executes one leased work unit to completion.
    ///
    /// # Errors
    ///
    /// Returns an execution error when the unit could not be processed.
    async fn execute(&self, unit: &WorkUnit) -> Result<()>;
}

/// Standard [`WorkProcessor`]: lease one unit, execute it, report.
///
/// A failed execution is logged and reported as an unsuccessful attempt so
/// the loop backs off; it never stops the pool.
#[derive(Debug)]
pub struct WorkUnitProcessor<C, E> {
    client: C,
    executor: E,
}

impl<C, E> WorkUnitProcessor<C, E> {
    /// Composes a lease client with a unit executor.
    #[must_use]
    pub fn new(client: C, executor: E) -> Self {
        Self { client, executor }
    }
}

#[async_trait]
impl<C, E> WorkProcessor for WorkUnitProcessor<C, E>
where
    C: WorkUnitClient,
    E: UnitExecutor,
{
    async fn get_and_perform_work(&self) -> Result<bool> {
        let Some(unit) = self.client.lease_work_unit().await? else {
            return Ok(false);
        };

        match self.executor.execute(&unit).await {
            Ok(()) => Ok(true),
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    work_id = unit.id.as_ref().map(sluice_core::WorkUnitId::as_str),
                    "work unit execution failed"
                );
                Ok(false)
            }
        }
    }
}

/// Runs one worker slot until its sleep is interrupted or a fatal error
/// surfaces.
pub(crate) async fn run_worker_loop<P, S>(
    slot: usize,
    processor: Arc<P>,
    sleeper: Arc<S>,
    mut backoff: ExponentialBackoff,
    metrics: HarnessMetrics,
) -> Result<()>
where
    P: WorkProcessor + ?Sized,
    S: Sleeper + ?Sized,
{
    loop {
        match processor.get_and_perform_work().await {
            Ok(true) => {
                metrics.record_attempt(outcome::WORK_FOUND);
                metrics.record_work_unit();
                backoff.reset();
                continue;
            }
            Ok(false) => {
                metrics.record_attempt(outcome::NO_WORK);
            }
            Err(error) if error.is_fatal() => {
                metrics.record_attempt(outcome::PROTOCOL_ERROR);
                tracing::error!(error = %error, slot, "fatal error; stopping worker pool");
                return Err(error);
            }
            Err(error) => {
                metrics.record_attempt(outcome::TRANSPORT_ERROR);
                tracing::warn!(error = %error, slot, "work attempt failed; will retry");
            }
        }

        let delay = backoff.next_delay();
        metrics.observe_backoff_delay(delay);
        tracing::debug!(
            slot,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "no work obtained; backing off"
        );

        match sleeper.sleep(delay).await {
            SleepOutcome::Completed => {}
            SleepOutcome::Interrupted => {
                tracing::debug!(slot, "backoff interrupted; worker loop stopping");
                return Ok(());
            }
        }
    }
}
