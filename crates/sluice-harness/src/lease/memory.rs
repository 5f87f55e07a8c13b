//! In-memory lease service implementation for testing.
//!
//! This module provides [`InMemoryLeaseService`], a scripted implementation
//! of the [`LeaseService`] trait suitable for tests and local development.
//!
//! ## Limitations
//!
//! - **NOT suitable for production**: No coordinator, no persistence
//! - **Scripted**: Responses are handed back in the order they were queued;
//!   once the script runs out, every lease returns an empty response

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{LeaseRequest, LeaseResponse, LeaseService};
use crate::error::{Error, Result};

/// Internal state protected by a single lock.
#[derive(Debug, Default)]
struct ServiceState {
    script: VecDeque<Result<LeaseResponse>>,
    requests: Vec<LeaseRequest>,
}

/// Scripted in-memory lease service.
///
/// Records every request it receives so tests can assert on the exact
/// protocol fields the client sent.
///
/// ## Example
///
/// ```rust
/// use sluice_harness::lease::{InMemoryLeaseService, LeaseResponse};
///
/// let service = InMemoryLeaseService::new();
/// service.push_response(LeaseResponse::empty());
/// // Lease through a client in tests...
/// ```
#[derive(Debug, Default)]
pub struct InMemoryLeaseService {
    state: Mutex<ServiceState>,
}

impl InMemoryLeaseService {
    /// Creates a new service with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response to hand back on a future lease call.
    pub fn push_response(&self, response: LeaseResponse) {
        self.lock().script.push_back(Ok(response));
    }

    /// Queues an error to hand back on a future lease call.
    pub fn push_error(&self, error: Error) {
        self.lock().script.push_back(Err(error));
    }

    /// Returns every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<LeaseRequest> {
        self.lock().requests.clone()
    }

    /// Returns the number of lease calls received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Locks the state, recovering from poisoning: the state only holds
    /// plain values, so a panicking holder cannot leave it inconsistent.
    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LeaseService for InMemoryLeaseService {
    async fn lease_work(&self, request: LeaseRequest) -> Result<LeaseResponse> {
        let mut state = self.lock();
        state.requests.push(request);
        state
            .script
            .pop_front()
            .unwrap_or_else(|| Ok(LeaseResponse::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lease::WorkUnit;
    use chrono::Utc;
    use sluice_core::{WorkUnitId, WorkerId};

    fn request() -> LeaseRequest {
        LeaseRequest {
            worker_id: WorkerId::new_unchecked("w-1"),
            worker_capabilities: vec!["w-1".into()],
            work_item_types: vec!["map_task".into()],
            current_worker_time: Utc::now(),
            requested_lease_duration_secs: 300,
        }
    }

    #[tokio::test]
    async fn scripted_responses_are_returned_in_order() {
        let service = InMemoryLeaseService::new();
        service.push_response(LeaseResponse::new(vec![
            WorkUnit::default().with_id(WorkUnitId::new("1")),
        ]));
        service.push_response(LeaseResponse::empty());

        let first = service.lease_work(request()).await.unwrap();
        assert_eq!(first.work_items.len(), 1);

        let second = service.lease_work(request()).await.unwrap();
        assert!(second.work_items.is_empty());

        // Script exhausted: further leases find nothing.
        let third = service.lease_work(request()).await.unwrap();
        assert!(third.work_items.is_empty());

        assert_eq!(service.request_count(), 3);
    }

    #[tokio::test]
    async fn scripted_errors_surface_to_the_caller() {
        let service = InMemoryLeaseService::new();
        service.push_error(Error::transport("connection refused"));

        let result = service.lease_work(request()).await;
        assert!(matches!(result, Err(Error::Transport { .. })));
        assert_eq!(service.request_count(), 1);
    }
}
