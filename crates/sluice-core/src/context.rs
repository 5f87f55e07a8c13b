//! Diagnostic context for log correlation.
//!
//! Every log line a worker emits should be attributable to the job, the
//! worker process, and the work unit in flight at the time. The job and
//! worker identifiers are fixed when the harness is created; the work unit
//! and stage identifiers are overwritten each time a unit is leased. There
//! is no teardown between units: at most one unit is in flight per worker
//! slot, so the next successful lease simply replaces the previous values.

use std::sync::{Arc, RwLock};

use crate::id::{JobId, WorkUnitId, WorkerId};

/// Work-unit fields of the context, replaced on each successful lease.
#[derive(Debug, Clone, Default)]
struct CurrentWork {
    work_id: Option<WorkUnitId>,
    stage_name: Option<String>,
}

#[derive(Debug)]
struct ContextInner {
    job_id: JobId,
    worker_id: WorkerId,
    current: RwLock<CurrentWork>,
}

/// Shared diagnostic context handle.
///
/// Cheap to clone; all clones observe the same state. Handed to the lease
/// client at construction and read by logging call sites. Concurrent
/// workers overwrite the work-unit fields last-writer-wins, so a reader
/// may observe values from another slot's lease; log lines that need exact
/// attribution should carry the unit explicitly.
#[derive(Debug, Clone)]
pub struct LogContext {
    inner: Arc<ContextInner>,
}

impl LogContext {
    /// Creates a context with the process-lifetime job and worker IDs.
    #[must_use]
    pub fn new(job_id: JobId, worker_id: WorkerId) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                job_id,
                worker_id,
                current: RwLock::new(CurrentWork::default()),
            }),
        }
    }

    /// Returns the job ID.
    #[must_use]
    pub fn job_id(&self) -> &JobId {
        &self.inner.job_id
    }

    /// Returns the worker ID.
    #[must_use]
    pub fn worker_id(&self) -> &WorkerId {
        &self.inner.worker_id
    }

    /// Records the identifiers of a freshly leased work unit.
    ///
    /// A lock poisoned by a panicking writer is recovered: the context
    /// only ever holds plain identifier values.
    pub fn set_work(&self, work_id: WorkUnitId, stage_name: Option<String>) {
        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        current.work_id = Some(work_id);
        current.stage_name = stage_name;
    }

    /// Returns the ID of the most recently leased work unit, if any.
    #[must_use]
    pub fn work_id(&self) -> Option<WorkUnitId> {
        self.inner
            .current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .work_id
            .clone()
    }

    /// Returns the stage name of the most recently leased work unit, if any.
    #[must_use]
    pub fn stage_name(&self) -> Option<String> {
        self.inner
            .current
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .stage_name
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> LogContext {
        LogContext::new(
            JobId::new_unchecked("job-1"),
            WorkerId::new_unchecked("worker-1"),
        )
    }

    #[test]
    fn job_and_worker_are_fixed_at_creation() {
        let ctx = context();
        assert_eq!(ctx.job_id().as_str(), "job-1");
        assert_eq!(ctx.worker_id().as_str(), "worker-1");
        assert_eq!(ctx.work_id(), None);
        assert_eq!(ctx.stage_name(), None);
    }

    #[test]
    fn set_work_overwrites_previous_unit() {
        let ctx = context();
        ctx.set_work(WorkUnitId::new("1234"), Some("stage-a".into()));
        assert_eq!(ctx.work_id().unwrap().as_str(), "1234");
        assert_eq!(ctx.stage_name().as_deref(), Some("stage-a"));

        ctx.set_work(WorkUnitId::new("5678"), None);
        assert_eq!(ctx.work_id().unwrap().as_str(), "5678");
        assert_eq!(ctx.stage_name(), None);
    }

    #[test]
    fn clones_share_state() {
        let ctx = context();
        let clone = ctx.clone();
        ctx.set_work(WorkUnitId::new("42"), Some("stage-b".into()));
        assert_eq!(clone.work_id().unwrap().as_str(), "42");
        assert_eq!(clone.stage_name().as_deref(), Some("stage-b"));
    }
}
