//! Observability infrastructure for Sluice.
//!
//! Structured logging with consistent spans. This module provides
//! initialization helpers and span constructors so every harness component
//! logs with the same correlation fields.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::context::LogContext;

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `sluice_harness=debug`)
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for one worker slot's lease/execute cycle.
///
/// # Example
///
/// ```rust
/// use sluice_core::context::LogContext;
/// use sluice_core::id::{JobId, WorkerId};
/// use sluice_core::observability::worker_span;
///
/// let ctx = LogContext::new(
///     JobId::new_unchecked("job-1"),
///     WorkerId::new_unchecked("worker-1"),
/// );
/// let span = worker_span(&ctx, 0);
/// let _guard = span.enter();
/// // ... lease and execute one unit
/// ```
#[must_use]
pub fn worker_span(context: &LogContext, slot: usize) -> Span {
    tracing::info_span!(
        "worker",
        job_id = %context.job_id(),
        worker_id = %context.worker_id(),
        slot = slot,
    )
}

/// Creates a span for a single lease attempt against the coordinator.
#[must_use]
pub fn lease_span(context: &LogContext) -> Span {
    tracing::info_span!(
        "lease",
        job_id = %context.job_id(),
        worker_id = %context.worker_id(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{JobId, WorkerId};

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Pretty);
    }

    #[test]
    fn worker_span_carries_context_fields() {
        let ctx = LogContext::new(
            JobId::new_unchecked("job-1"),
            WorkerId::new_unchecked("worker-1"),
        );
        let span = worker_span(&ctx, 3);
        let _guard = span.enter();
        tracing::info!("message inside worker span");
    }
}
