//! Work-unit client: acquires at most one unit per request.
//!
//! The coordinator's wire format technically allows a response to carry a
//! list of work items, but this client is built around leasing exactly one
//! unit at a time: a longer list means the coordinator and client disagree
//! about the protocol, which no amount of retrying can fix.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use sluice_core::LogContext;

use crate::config::WorkerConfig;
use crate::error::{Error, Result};
use crate::lease::{
    CAPABILITY_CUSTOM_SOURCE, CAPABILITY_REMOTE_SOURCE, LeaseRequest, LeaseService,
    WORK_ITEM_TYPE_MAP, WORK_ITEM_TYPE_REMOTE_SOURCE, WORK_ITEM_TYPE_SEQ_MAP, WorkUnit,
};

/// Client-side view of the work-lease operation.
///
/// Implementations return at most one work unit per call; `Ok(None)` is
/// the normal "nothing to do right now" outcome and is not an error.
#[async_trait]
pub trait WorkUnitClient: Send + Sync {
    /// Attempts to lease one work unit from the coordinator.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the exchange failed, or a protocol
    /// error if the response contained more than one work item.
    async fn lease_work_unit(&self) -> Result<Option<WorkUnit>>;
}

/// Lease client bound to one worker's configuration and log context.
///
/// Builds a fresh [`LeaseRequest`] per attempt, sends it through the
/// [`LeaseService`], validates the response, and records the leased unit's
/// identifiers in the diagnostic context before handing the unit back.
#[derive(Debug)]
pub struct CoordinatorWorkClient<S> {
    service: Arc<S>,
    config: WorkerConfig,
    context: LogContext,
}

impl<S: LeaseService> CoordinatorWorkClient<S> {
    /// Creates a client leasing through `service`.
    #[must_use]
    pub fn new(service: Arc<S>, config: WorkerConfig, context: LogContext) -> Self {
        Self {
            service,
            config,
            context,
        }
    }

    fn build_request(&self) -> LeaseRequest {
        LeaseRequest {
            worker_id: self.config.worker_id.clone(),
            worker_capabilities: vec![
                self.config.worker_id.to_string(),
                CAPABILITY_REMOTE_SOURCE.to_string(),
                CAPABILITY_CUSTOM_SOURCE.to_string(),
            ],
            work_item_types: vec![
                WORK_ITEM_TYPE_MAP.to_string(),
                WORK_ITEM_TYPE_SEQ_MAP.to_string(),
                WORK_ITEM_TYPE_REMOTE_SOURCE.to_string(),
            ],
            current_worker_time: Utc::now(),
            requested_lease_duration_secs: self.config.requested_lease_duration.as_secs(),
        }
    }
}

#[async_trait]
impl<S: LeaseService> WorkUnitClient for CoordinatorWorkClient<S> {
    async fn lease_work_unit(&self) -> Result<Option<WorkUnit>> {
        let response = self.service.lease_work(self.build_request()).await?;

        let mut work_items = response.work_items;
        match work_items.len() {
            0 => {
                tracing::trace!("coordinator returned no work items");
                Ok(None)
            }
            1 => {
                let unit = work_items.remove(0);
                if !unit.has_work_id() {
                    tracing::trace!("coordinator returned a work item without a work ID");
                    return Ok(None);
                }

                // The id is known to be present: has_work_id() checked it.
                if let Some(work_id) = unit.id.clone() {
                    self.context
                        .set_work(work_id, unit.stage_name().map(str::to_string));
                }
                tracing::debug!(
                    work_id = unit.id.as_ref().map(sluice_core::WorkUnitId::as_str),
                    stage = unit.stage_name(),
                    "leased work unit"
                );
                Ok(Some(unit))
            }
            n => Err(Error::protocol(format!(
                "coordinator returned more than one work item ({n}); \
                 this client expects at most one"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lease::{InMemoryLeaseService, LeaseResponse};
    use sluice_core::{JobId, ProjectId, WorkUnitId, WorkerId};

    const PROJECT_ID: &str = "test-project";
    const JOB_ID: &str = "test-job";
    const WORKER_ID: &str = "test-worker";

    fn client(service: Arc<InMemoryLeaseService>) -> CoordinatorWorkClient<InMemoryLeaseService> {
        let config = WorkerConfig::new(
            ProjectId::new_unchecked(PROJECT_ID),
            JobId::new_unchecked(JOB_ID),
            WorkerId::new_unchecked(WORKER_ID),
        );
        let context = LogContext::new(config.job_id.clone(), config.worker_id.clone());
        CoordinatorWorkClient::new(service, config, context)
    }

    fn unit_with_id(id: &str) -> WorkUnit {
        WorkUnit::new(
            ProjectId::new_unchecked(PROJECT_ID),
            JobId::new_unchecked(JOB_ID),
        )
        .with_id(WorkUnitId::new(id))
    }

    #[tokio::test]
    async fn request_carries_identity_capabilities_and_types() {
        let service = Arc::new(InMemoryLeaseService::new());
        let client = client(Arc::clone(&service));

        let leased = client.lease_work_unit().await.unwrap();
        assert!(leased.is_none());

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.worker_id.as_str(), WORKER_ID);
        assert_eq!(
            request.worker_capabilities,
            vec![WORKER_ID, "remote_source", "custom_source"]
        );
        assert_eq!(
            request.work_item_types,
            vec!["map_task", "seq_map_task", "remote_source_task"]
        );
        assert_eq!(request.requested_lease_duration_secs, 300);
    }

    #[tokio::test]
    async fn leases_a_valid_unit_and_records_its_work_id() {
        let service = Arc::new(InMemoryLeaseService::new());
        let expected = unit_with_id("1234");
        service.push_response(LeaseResponse::new(vec![expected.clone()]));
        let client = client(service);

        let leased = client.lease_work_unit().await.unwrap();
        assert_eq!(leased, Some(expected));
        assert_eq!(client.context.work_id().unwrap().as_str(), "1234");
    }

    #[tokio::test]
    async fn empty_response_means_no_work() {
        let service = Arc::new(InMemoryLeaseService::new());
        service.push_response(LeaseResponse::empty());
        let client = client(service);

        assert!(client.lease_work_unit().await.unwrap().is_none());
        assert!(client.context.work_id().is_none());
    }

    #[tokio::test]
    async fn unit_without_id_means_no_work() {
        let service = Arc::new(InMemoryLeaseService::new());
        service.push_response(LeaseResponse::new(vec![WorkUnit::default()]));
        let client = client(service);

        assert!(client.lease_work_unit().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unit_with_empty_id_means_no_work() {
        let service = Arc::new(InMemoryLeaseService::new());
        service.push_response(LeaseResponse::new(vec![unit_with_id("")]));
        let client = client(service);

        assert!(client.lease_work_unit().await.unwrap().is_none());
        assert!(client.context.work_id().is_none());
    }

    #[tokio::test]
    async fn two_work_items_is_a_protocol_violation() {
        let service = Arc::new(InMemoryLeaseService::new());
        service.push_response(LeaseResponse::new(vec![
            unit_with_id("1"),
            unit_with_id("2"),
        ]));
        let client = client(service);

        let error = client.lease_work_unit().await.unwrap_err();
        assert!(error.is_fatal());
        let message = error.to_string();
        assert!(message.contains("more than one work item"));
        assert!(message.contains("expects at most one"));
    }

    #[tokio::test]
    async fn map_task_stage_name_propagates_to_context() {
        let service = Arc::new(InMemoryLeaseService::new());
        service.push_response(LeaseResponse::new(vec![
            unit_with_id("1").with_map_task("test_stage_name"),
        ]));
        let client = client(service);

        client.lease_work_unit().await.unwrap();
        assert_eq!(client.context.stage_name().as_deref(), Some("test_stage_name"));
    }

    #[tokio::test]
    async fn seq_map_task_stage_name_propagates_to_context() {
        let service = Arc::new(InMemoryLeaseService::new());
        service.push_response(LeaseResponse::new(vec![
            unit_with_id("1").with_seq_map_task("test_stage_name"),
        ]));
        let client = client(service);

        client.lease_work_unit().await.unwrap();
        assert_eq!(client.context.stage_name().as_deref(), Some("test_stage_name"));
    }

    #[tokio::test]
    async fn stage_name_persists_until_the_next_lease_overwrites_it() {
        let service = Arc::new(InMemoryLeaseService::new());
        service.push_response(LeaseResponse::new(vec![
            unit_with_id("1").with_map_task("first_stage"),
        ]));
        service.push_response(LeaseResponse::empty());
        service.push_response(LeaseResponse::new(vec![
            unit_with_id("2").with_map_task("second_stage"),
        ]));
        let client = client(service);

        client.lease_work_unit().await.unwrap();
        assert_eq!(client.context.stage_name().as_deref(), Some("first_stage"));

        // An empty lease does not disturb the recorded stage.
        client.lease_work_unit().await.unwrap();
        assert_eq!(client.context.stage_name().as_deref(), Some("first_stage"));

        client.lease_work_unit().await.unwrap();
        assert_eq!(client.context.stage_name().as_deref(), Some("second_stage"));
        assert_eq!(client.context.work_id().unwrap().as_str(), "2");
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let service = Arc::new(InMemoryLeaseService::new());
        service.push_error(Error::transport("connection refused"));
        let client = client(service);

        let error = client.lease_work_unit().await.unwrap_err();
        assert!(!error.is_fatal());
        assert!(matches!(error, Error::Transport { .. }));
    }
}
