//! Transaction context for OCC
//!
//! TransactionContext tracks the reads and buffered writes of one
//! transaction attempt, enabling validation at commit time.
//!
//! Reads are served from the snapshot taken at `start_version`, except under
//! read-committed isolation where every read sees the latest published
//! version. Writes are buffered and become visible only when the
//! [`TransactionManager`](crate::TransactionManager) applies them.

use crate::validation::{validate_transaction, ValidationResult};
use skewcheck_core::{IsolationLevel, Key, Record, StoreError, StoreResult};
use skewcheck_storage::VersionedStore;
use std::collections::{BTreeMap, HashMap};

/// Error type for commit failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommitError {
    /// Transaction aborted due to validation conflicts
    #[error("commit failed: {} conflict(s)", .0.conflict_count())]
    ValidationFailed(ValidationResult),

    /// Transaction was not in correct state for commit
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl From<CommitError> for StoreError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::ValidationFailed(result) => match result.conflicts.first() {
                Some(conflict) => StoreError::contention(conflict.key().clone(), conflict.describe()),
                None => StoreError::InvalidState("validation failed without conflicts".into()),
            },
            CommitError::InvalidState(msg) => StoreError::InvalidState(msg),
        }
    }
}

/// Status of a transaction in its lifecycle
///
/// State transitions:
/// - `Active` → `Validating` (begin commit)
/// - `Validating` → `Committed` (validation passed)
/// - `Validating` → `Aborted` (conflict detected)
/// - `Active` → `Aborted` (rollback)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is executing, can read/write
    Active,
    /// Transaction is being validated for conflicts
    Validating,
    /// Transaction committed successfully
    Committed,
    /// Transaction was aborted
    Aborted {
        /// Human-readable reason for abort
        reason: String,
    },
}

/// Read/write state of one transaction attempt
#[derive(Debug)]
pub struct TransactionContext {
    /// Unique transaction identifier
    pub txn_id: u64,
    /// Global version the snapshot was taken at
    pub start_version: u64,
    /// Isolation the transaction runs under
    pub isolation: IsolationLevel,
    /// Keys read, with the commit version observed (0 = absent)
    pub read_set: HashMap<Key, u64>,
    /// Buffered writes, applied at commit
    pub write_set: BTreeMap<Key, Record>,
    /// Lifecycle state
    pub status: TransactionStatus,
    pub(crate) snapshot_registered: bool,
}

impl TransactionContext {
    /// Create a new active transaction
    pub fn new(txn_id: u64, start_version: u64, isolation: IsolationLevel) -> Self {
        Self {
            txn_id,
            start_version,
            isolation,
            read_set: HashMap::new(),
            write_set: BTreeMap::new(),
            status: TransactionStatus::Active,
            snapshot_registered: false,
        }
    }

    /// Read `key`
    ///
    /// Buffered writes of this transaction are returned first
    /// (read-your-writes). Otherwise the read goes to the store at the
    /// version the isolation level dictates and is recorded in the read set,
    /// including reads of absent keys.
    pub fn get(&mut self, key: &Key, store: &VersionedStore) -> StoreResult<Record> {
        self.ensure_active()?;

        if let Some(record) = self.write_set.get(key) {
            return Ok(record.clone());
        }

        let read_at = match self.isolation {
            IsolationLevel::ReadCommitted => store.version(),
            IsolationLevel::SnapshotIsolation | IsolationLevel::Serializable => {
                self.start_version
            }
        };

        match store.get_at(key, read_at) {
            Some(versioned) => {
                self.read_set.entry(key.clone()).or_insert(versioned.version);
                Ok(versioned.record)
            }
            None => {
                self.read_set.entry(key.clone()).or_insert(0);
                Err(StoreError::NotFound(key.clone()))
            }
        }
    }

    /// Buffer an upsert
    pub fn put(&mut self, key: Key, record: Record) -> StoreResult<()> {
        self.ensure_active()?;
        self.write_set.insert(key, record);
        Ok(())
    }

    /// Whether the transaction has no buffered writes
    pub fn is_read_only(&self) -> bool {
        self.write_set.is_empty()
    }

    /// Number of buffered writes
    pub fn pending_writes(&self) -> usize {
        self.write_set.len()
    }

    /// Whether the transaction can still read and write
    pub fn is_active(&self) -> bool {
        self.status == TransactionStatus::Active
    }

    /// Whether the transaction can still be rolled back
    pub fn can_rollback(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Active | TransactionStatus::Validating
        )
    }

    /// Fail unless the transaction is active
    pub fn ensure_active(&self) -> StoreResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(StoreError::TransactionClosed {
                txn_id: self.txn_id,
            })
        }
    }

    /// Validate against the store and transition to `Committed` or `Aborted`
    ///
    /// Must be called with the manager's commit lock held.
    ///
    /// # State Transition
    /// `Active` → `Validating` → `Committed` | `Aborted`
    pub fn commit(&mut self, store: &VersionedStore) -> Result<(), CommitError> {
        if !self.is_active() {
            return Err(CommitError::InvalidState(format!(
                "transaction {} is not active: {:?}",
                self.txn_id, self.status
            )));
        }
        self.status = TransactionStatus::Validating;

        let result = validate_transaction(self, store);
        if !result.is_valid() {
            self.status = TransactionStatus::Aborted {
                reason: format!("{} conflict(s)", result.conflict_count()),
            };
            self.write_set.clear();
            return Err(CommitError::ValidationFailed(result));
        }

        self.status = TransactionStatus::Committed;
        Ok(())
    }

    /// Transition to `Aborted`, discarding buffered writes
    ///
    /// # Errors
    /// Fails if the transaction already committed or aborted.
    pub fn mark_aborted(&mut self, reason: impl Into<String>) -> StoreResult<()> {
        match &self.status {
            TransactionStatus::Committed => Err(StoreError::InvalidState(format!(
                "cannot abort committed transaction {}",
                self.txn_id
            ))),
            TransactionStatus::Aborted { .. } => Err(StoreError::TransactionClosed {
                txn_id: self.txn_id,
            }),
            _ => {
                self.status = TransactionStatus::Aborted {
                    reason: reason.into(),
                };
                // read_set is kept for diagnostics
                self.write_set.clear();
                Ok(())
            }
        }
    }

    /// Move the buffered writes out of the context
    pub(crate) fn take_writes(&mut self) -> BTreeMap<Key, Record> {
        std::mem::take(&mut self.write_set)
    }
}
