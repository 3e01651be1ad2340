//! Harness error types
//!
//! Two levels:
//! - [`WorkerError`]: what one worker transaction can fail with. Resolved by
//!   the runner; never ends the driver loop on its own.
//! - [`HarnessError`]: fatal conditions surfaced to the driver (broken setup,
//!   reproduced anomaly, incomplete dataset, bad configuration).

use skewcheck_core::{Anomaly, StoreError};
use thiserror::Error;

/// Result type alias for harness operations
pub type HarnessResult<T> = std::result::Result<T, HarnessError>;

/// Failure of a single worker transaction
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkerError {
    /// Store call or commit failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The worker observed state that breaks the scenario invariant
    #[error("inconsistent state observed: {0}")]
    Inconsistent(String),
}

impl WorkerError {
    /// Whether the store refused the transaction for contention
    pub fn is_contention(&self) -> bool {
        matches!(self, WorkerError::Store(e) if e.is_contention())
    }
}

/// Fatal harness errors
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The initial scenario state could not be written
    #[error("setup of {scenario} failed: {source}")]
    Setup {
        /// Scenario name
        scenario: &'static str,
        /// Store failure
        #[source]
        source: StoreError,
    },

    /// The store permitted an anomaly
    #[error("{scenario}: {anomaly} detected: {details}")]
    InvariantViolation {
        /// Scenario name
        scenario: &'static str,
        /// Anomaly the scenario probes
        anomaly: Anomaly,
        /// Violating values
        details: String,
    },

    /// A batch of the bulk dataset could not be written
    #[error("bulk load failed at batch starting with id {first_id}: {source}")]
    BulkLoad {
        /// First id of the failing batch
        first_id: i64,
        /// Store failure
        #[source]
        source: StoreError,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Not enough sessions, or a session could not be opened
    #[error("session error: {0}")]
    Session(String),

    /// A worker thread panicked
    #[error("worker {role} panicked")]
    WorkerPanicked {
        /// Role of the worker
        role: &'static str,
    },
}

impl HarnessError {
    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        HarnessError::Config(message.into())
    }

    /// Whether this error reports a reproduced anomaly
    pub fn is_violation(&self) -> bool {
        matches!(self, HarnessError::InvariantViolation { .. })
    }
}

impl From<StoreError> for HarnessError {
    fn from(e: StoreError) -> Self {
        HarnessError::Session(e.to_string())
    }
}
