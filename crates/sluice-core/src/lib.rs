//! # sluice-core
//!
//! Core abstractions for the Sluice distributed worker harness.
//!
//! This crate provides the foundational types used across all Sluice
//! components:
//!
//! - **Identifiers**: Strongly-typed IDs for jobs, workers, projects, and
//!   work units
//! - **Diagnostic Context**: Per-harness log correlation state
//! - **Observability**: Logging initialization and span constructors
//! - **Error Types**: Shared error definitions and result types
//!
//! ## Example
//!
//! ```rust
//! use sluice_core::prelude::*;
//!
//! let job = JobId::new("job-2026-08").unwrap();
//! let worker = WorkerId::generate();
//! let context = LogContext::new(job, worker);
//! assert!(context.work_id().is_none());
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]

pub mod context;
pub mod error;
pub mod id;
pub mod observability;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use sluice_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::context::LogContext;
    pub use crate::error::{Error, Result};
    pub use crate::id::{JobId, ProjectId, WorkUnitId, WorkerId};
    pub use crate::observability::{LogFormat, init_logging};
}

// Re-export key types at crate root for ergonomics
pub use context::LogContext;
pub use error::{Error, Result};
pub use id::{JobId, ProjectId, WorkUnitId, WorkerId};
pub use observability::{LogFormat, init_logging, lease_span, worker_span};
