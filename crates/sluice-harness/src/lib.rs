//! # sluice-harness
//!
//! Worker-pool execution harness for the Sluice distributed processing
//! worker.
//!
//! A harness process repeatedly leases a single unit of work from the
//! coordinator, executes it, and reports readiness for more. This crate
//! provides the machinery around that cycle:
//!
//! - **Backoff Policy**: Interval-capped, unbounded-count exponential
//!   retry with jitter
//! - **Lease Protocol Client**: Builds lease requests, validates the
//!   at-most-one-unit invariant, propagates diagnostic identifiers
//! - **Worker Loop**: Per-slot attempt/backoff cycle with a cancellable
//!   sleep as the shutdown point
//! - **Pool Controller**: Resolves the pool size and owns the loops'
//!   lifecycle
//!
//! ## Guarantees
//!
//! - **Forward progress under failure**: Empty leases and transport
//!   failures are retried forever; only the retry interval is bounded
//! - **Bounded retry cost**: Delays are capped and jittered so a fleet of
//!   failing workers does not retry in lockstep
//! - **Loud protocol failures**: A response carrying more than one work
//!   item stops the pool instead of being papered over
//! - **Independent slots**: Each worker loop owns its backoff state; one
//!   slot's failures never slow another slot down
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use sluice_core::{JobId, ProjectId, WorkerId};
//! use sluice_harness::prelude::*;
//!
//! let config = WorkerConfig::new(
//!     ProjectId::new("acme-analytics").unwrap(),
//!     JobId::new("job-2026-08-04").unwrap(),
//!     WorkerId::generate(),
//! )
//! .with_worker_threads(4);
//!
//! let harness = WorkerHarness::new(config);
//! let service = Arc::new(InMemoryLeaseService::new());
//! let _client = harness.work_unit_client(service);
//! // harness.process_work(processor, sleeper).await runs the pool.
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod backoff;
pub mod client;
pub mod config;
pub mod error;
pub mod harness;
pub mod lease;
pub mod metrics;
pub mod sleeper;
pub mod worker;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::backoff::ExponentialBackoff;
    pub use crate::client::{CoordinatorWorkClient, WorkUnitClient};
    pub use crate::config::WorkerConfig;
    pub use crate::error::{Error, Result};
    pub use crate::harness::WorkerHarness;
    pub use crate::lease::{
        HttpLeaseService, InMemoryLeaseService, LeaseRequest, LeaseResponse, LeaseService,
        WorkUnit,
    };
    pub use crate::metrics::HarnessMetrics;
    pub use crate::sleeper::{
        InstantSleeper, ShutdownHandle, ShutdownSleeper, SleepOutcome, Sleeper, TokioSleeper,
    };
    pub use crate::worker::{UnitExecutor, WorkProcessor, WorkUnitProcessor};
}

// Re-export key types at crate root for ergonomics
pub use backoff::ExponentialBackoff;
pub use client::{CoordinatorWorkClient, WorkUnitClient};
pub use config::WorkerConfig;
pub use error::{Error, Result};
pub use harness::WorkerHarness;
pub use lease::{LeaseRequest, LeaseResponse, LeaseService, StagePayload, WorkUnit};
pub use sleeper::{ShutdownHandle, ShutdownSleeper, SleepOutcome, Sleeper, TokioSleeper};
pub use worker::{UnitExecutor, WorkProcessor, WorkUnitProcessor};
