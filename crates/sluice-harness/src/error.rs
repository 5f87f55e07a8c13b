//! Error types for the worker harness.
//!
//! The harness distinguishes failures by how the retry loop must react:
//! transport failures are retryable (the coordinator may recover), protocol
//! violations are fatal (retrying an incompatible coordinator/client
//! pairing cannot help), and execution failures burn one attempt without
//! stopping the loop.

/// The result type used throughout `sluice-harness`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in harness operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The lease RPC could not complete.
    ///
    /// Retryable: the worker loop treats this like an empty lease and
    /// backs off.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The coordinator response violated the lease protocol.
    ///
    /// Fatal: surfaced to whatever supervises the pool.
    #[error("protocol violation: {message}")]
    Protocol {
        /// Description of the violation.
        message: String,
    },

    /// Executing a leased work unit failed.
    #[error("work unit execution failed: {message}")]
    Execution {
        /// Description of the execution failure.
        message: String,
        /// The underlying cause, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid or missing configuration.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// An internal error occurred that should not happen in normal operation.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },

    /// An error from sluice-core.
    #[error("core error: {0}")]
    Core(#[from] sluice_core::Error),
}

impl Error {
    /// Creates a new transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new transport error with a source cause.
    #[must_use]
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new protocol-violation error.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a new execution error.
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new execution error with a source cause.
    #[must_use]
    pub fn execution_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Execution {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error must stop the worker pool.
    ///
    /// Only protocol violations are fatal; everything else is absorbed by
    /// the retry loop.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Protocol { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_errors_are_fatal() {
        assert!(Error::protocol("two work items").is_fatal());
        assert!(!Error::transport("connection refused").is_fatal());
        assert!(!Error::execution("stage failed").is_fatal());
        assert!(!Error::configuration("missing job ID").is_fatal());
    }

    #[test]
    fn transport_error_chains_source() {
        let source = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err = Error::transport_with_source("lease call failed", source);
        assert!(err.to_string().contains("transport error"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
