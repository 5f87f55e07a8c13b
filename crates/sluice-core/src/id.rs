//! Strongly-typed identifiers for Sluice entities.
//!
//! All identifiers assigned by the coordinator (job, project, work unit)
//! are opaque tokens: the harness never interprets their contents, only
//! carries them. Typed wrappers prevent mixing them up at compile time and
//! give each a transparent serde encoding matching the wire format.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

use crate::error::{Error, Result};

/// A unique identifier for the job this worker participates in.
///
/// Assigned by the coordinator when the job is created; fixed for the
/// lifetime of the harness process.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Creates a new job ID after checking it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::invalid_id("job ID must not be empty"));
        }
        Ok(Self(id))
    }

    /// Creates a job ID without validation.
    ///
    /// Intended for IDs that have already been validated (e.g. decoded
    /// from a coordinator response).
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the job ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for the project/namespace owning the job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a new project ID after checking it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::invalid_id("project ID must not be empty"));
        }
        Ok(Self(id))
    }

    /// Creates a project ID without validation.
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the project ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unique identifier for one worker process.
///
/// Offered to the coordinator both as the requesting identity and as the
/// leading worker capability tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerId(String);

impl WorkerId {
    /// Creates a new worker ID after checking it is non-empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::invalid_id("worker ID must not be empty"));
        }
        Ok(Self(id))
    }

    /// Creates a worker ID without validation.
    #[must_use]
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh worker ID.
    ///
    /// Used when deployment configuration does not assign one. ULIDs are
    /// globally unique without coordination and sort by creation time.
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new().to_string())
    }

    /// Returns the worker ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identifier of a leasable work unit.
///
/// Unlike the other identifiers, a work unit ID may arrive unset or empty
/// on the wire: the coordinator signals "no work available" by returning a
/// unit without one. The lease client is responsible for treating such
/// units as empty results, so this type performs no validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkUnitId(String);

impl WorkUnitId {
    /// Creates a work unit ID from its wire representation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns true if the ID carries no value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the work unit ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
