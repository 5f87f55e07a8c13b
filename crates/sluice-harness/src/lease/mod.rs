//! Work-lease protocol types and transport abstraction.
//!
//! This module provides:
//!
//! - [`LeaseRequest`] / [`LeaseResponse`]: Serializable lease exchange payloads
//! - [`WorkUnit`]: One leasable task as returned by the coordinator
//! - [`LeaseService`]: Trait for the request/response transport
//! - [`HttpLeaseService`]: Production HTTP implementation
//! - [`InMemoryLeaseService`]: Scripted in-memory implementation for testing
//!
//! ## Design Principles
//!
//! - **Transport agnostic**: The same client works over HTTP or a test fake
//! - **Wire-tolerant**: The response format permits any number of work
//!   items; the ≤ 1 invariant is enforced by the client, not here
//! - **Structured payloads**: JSON-serializable camelCase envelopes

pub mod http;
pub mod memory;

pub use http::HttpLeaseService;
pub use memory::InMemoryLeaseService;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sluice_core::{JobId, ProjectId, WorkUnitId, WorkerId};

use crate::error::Result;

/// Capability tag for workers able to read remote sources.
pub const CAPABILITY_REMOTE_SOURCE: &str = "remote_source";

/// Capability tag for workers able to read custom sources.
pub const CAPABILITY_CUSTOM_SOURCE: &str = "custom_source";

/// Work-item type tag for parallel map stages.
pub const WORK_ITEM_TYPE_MAP: &str = "map_task";

/// Work-item type tag for sequential map stages.
pub const WORK_ITEM_TYPE_SEQ_MAP: &str = "seq_map_task";

/// Work-item type tag for remote-source reads.
pub const WORK_ITEM_TYPE_REMOTE_SOURCE: &str = "remote_source_task";

/// Stage descriptor carried by a work unit.
///
/// The coordinator attaches one of these (as a map task or a sequential
/// map task) so log lines can name the pipeline stage being executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePayload {
    /// Human-readable stage name.
    pub stage_name: String,
}

impl StagePayload {
    /// Creates a stage payload with the given name.
    #[must_use]
    pub fn new(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
        }
    }
}

/// One leasable unit of work as returned by the coordinator.
///
/// Every field is optional on the wire: a coordinator with nothing to hand
/// out may answer with an entirely empty unit. A unit without a set id
/// means "no work available" and is never executed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkUnit {
    /// Unique work identifier; absence or emptiness means "no work".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<WorkUnitId>,

    /// Job this unit belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,

    /// Project/namespace owning the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    /// Parallel map stage descriptor, if this unit is a map task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_task: Option<StagePayload>,

    /// Sequential map stage descriptor, if this unit is a seq-map task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq_map_task: Option<StagePayload>,
}

impl WorkUnit {
    /// Creates a work unit scoped to the given project and job.
    #[must_use]
    pub fn new(project_id: ProjectId, job_id: JobId) -> Self {
        Self {
            project_id: Some(project_id),
            job_id: Some(job_id),
            ..Self::default()
        }
    }

    /// Sets the work identifier.
    #[must_use]
    pub fn with_id(mut self, id: WorkUnitId) -> Self {
        self.id = Some(id);
        self
    }

    /// Attaches a map-task stage descriptor.
    #[must_use]
    pub fn with_map_task(mut self, stage_name: impl Into<String>) -> Self {
        self.map_task = Some(StagePayload::new(stage_name));
        self
    }

    /// Attaches a sequential-map-task stage descriptor.
    #[must_use]
    pub fn with_seq_map_task(mut self, stage_name: impl Into<String>) -> Self {
        self.seq_map_task = Some(StagePayload::new(stage_name));
        self
    }

    /// Returns true if this unit carries a usable work identifier.
    #[must_use]
    pub fn has_work_id(&self) -> bool {
        self.id.as_ref().is_some_and(|id| !id.is_empty())
    }

    /// Returns the stage name from whichever stage descriptor is present.
    #[must_use]
    pub fn stage_name(&self) -> Option<&str> {
        self.map_task
            .as_ref()
            .or(self.seq_map_task.as_ref())
            .map(|stage| stage.stage_name.as_str())
    }
}

/// Outbound lease request, constructed fresh per attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseRequest {
    /// Identity of the requesting worker.
    pub worker_id: WorkerId,

    /// Capabilities offered, in protocol order: the worker id itself,
    /// followed by the fixed capability tags.
    pub worker_capabilities: Vec<String>,

    /// Work-item type tags this worker is able to execute, in protocol
    /// order.
    pub work_item_types: Vec<String>,

    /// Worker wall-clock time at request construction.
    pub current_worker_time: DateTime<Utc>,

    /// Lease duration the worker asks for, in seconds.
    pub requested_lease_duration_secs: u64,
}

/// Inbound lease result.
///
/// The wire format permits any number of work items; this client treats
/// more than one as a protocol violation (enforced in
/// [`CoordinatorWorkClient`](crate::client::CoordinatorWorkClient)).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseResponse {
    /// Work items granted by the coordinator.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub work_items: Vec<WorkUnit>,
}

impl LeaseResponse {
    /// Creates a response granting the given units.
    #[must_use]
    pub fn new(work_items: Vec<WorkUnit>) -> Self {
        Self { work_items }
    }

    /// Creates a response granting nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// The lease request/response transport.
///
/// Implementations carry a [`LeaseRequest`] to the coordinator and return
/// its [`LeaseResponse`]. Failures to complete the exchange surface as
/// transport errors, which the worker loop treats as retryable; decoding
/// and validation of the response body is the client's job, not the
/// transport's.
///
/// ## Thread Safety
///
/// All methods are `Send + Sync`: one transport instance is shared by
/// every worker slot in the pool.
#[async_trait]
pub trait LeaseService: Send + Sync {
    /// Sends one lease request and awaits the coordinator's response.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the exchange could not complete.
    async fn lease_work(&self, request: LeaseRequest) -> Result<LeaseResponse>;
}
