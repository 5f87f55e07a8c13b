//! Observability metrics for the worker harness.
//!
//! Metrics are exposed via the `metrics` crate facade. Install an exporter
//! (e.g. `metrics_exporter_prometheus`) at process startup to publish them.
//!
//! ## Metrics Exported
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `sluice_lease_attempts_total` | Counter | `result` | Lease attempts by outcome |
//! | `sluice_work_units_total` | Counter | - | Work units leased and executed |
//! | `sluice_backoff_delay_seconds` | Histogram | - | Requested backoff delays |
//! | `sluice_active_workers` | Gauge | - | Worker loops currently running |

use std::time::Duration;

use metrics::{counter, gauge, histogram};

/// Metric names as constants for consistency.
pub mod names {
    /// Counter: Lease attempts by outcome.
    pub const LEASE_ATTEMPTS_TOTAL: &str = "sluice_lease_attempts_total";
    /// Counter: Work units leased and executed.
    pub const WORK_UNITS_TOTAL: &str = "sluice_work_units_total";
    /// Histogram: Requested backoff delays in seconds.
    pub const BACKOFF_DELAY_SECONDS: &str = "sluice_backoff_delay_seconds";
    /// Gauge: Worker loops currently running.
    pub const ACTIVE_WORKERS: &str = "sluice_active_workers";
}

/// Label keys used across metrics.
pub mod labels {
    /// Attempt outcome (`work_found`, `no_work`, `transport_error`,
    /// `protocol_error`).
    pub const RESULT: &str = "result";
}

/// High-level interface for recording harness metrics.
///
/// Cheap to clone and share across worker loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarnessMetrics;

impl HarnessMetrics {
    /// Creates a new metrics recorder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Records the outcome of one lease/execute attempt.
    pub fn record_attempt(&self, result: &str) {
        counter!(
            names::LEASE_ATTEMPTS_TOTAL,
            labels::RESULT => result.to_string(),
        )
        .increment(1);
    }

    /// Records a successfully leased and executed work unit.
    pub fn record_work_unit(&self) {
        counter!(names::WORK_UNITS_TOTAL).increment(1);
    }

    /// Records a requested backoff delay.
    pub fn observe_backoff_delay(&self, delay: Duration) {
        histogram!(names::BACKOFF_DELAY_SECONDS).record(delay.as_secs_f64());
    }

    /// Sets the number of running worker loops.
    #[allow(clippy::cast_precision_loss)] // Gauge values are typically small
    pub fn set_active_workers(&self, count: usize) {
        gauge!(names::ACTIVE_WORKERS).set(count as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_an_installed_exporter_is_a_no_op() {
        let metrics = HarnessMetrics::new();
        metrics.record_attempt("no_work");
        metrics.record_work_unit();
        metrics.observe_backoff_delay(Duration::from_secs(5));
        metrics.set_active_workers(4);
    }
}
