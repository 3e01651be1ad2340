//! Error types for the store client facade
//!
//! The harness classifies every store failure into exactly two buckets:
//! contention aborts (expected under the anomaly scenarios) and everything
//! else. [`StoreError::is_contention`] is that classifier.

use crate::types::Key;
use thiserror::Error;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by a store backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Commit refused because of conflicting concurrent access
    ///
    /// This is the backend's "too much contention, try again" signal. The
    /// harness never retries it.
    #[error("too much contention on {key}: {reason}")]
    Contention {
        /// Key the conflict was detected on
        key: Key,
        /// Backend-provided description
        reason: String,
    },

    /// No record stored under the key
    #[error("no such entity: {0}")]
    NotFound(Key),

    /// Operation on a transaction that already committed or aborted
    #[error("transaction {txn_id} is no longer active")]
    TransactionClosed {
        /// Identifier of the closed transaction
        txn_id: u64,
    },

    /// Operation not valid in the current state
    #[error("invalid operation: {0}")]
    InvalidState(String),

    /// Any other backend failure (connection, rpc, storage)
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Build a contention error
    pub fn contention(key: Key, reason: impl Into<String>) -> Self {
        StoreError::Contention {
            key,
            reason: reason.into(),
        }
    }

    /// Build a generic backend error
    pub fn backend(message: impl Into<String>) -> Self {
        StoreError::Backend(message.into())
    }

    /// Whether this error is a contention abort
    pub fn is_contention(&self) -> bool {
        matches!(self, StoreError::Contention { .. })
    }
}
