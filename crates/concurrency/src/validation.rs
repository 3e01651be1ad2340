//! Transaction validation for OCC
//!
//! Conflict detection depends on the isolation level the transaction runs at:
//!
//! | Level | Read set | Write set |
//! |---|---|---|
//! | `ReadCommitted` | not validated | not validated |
//! | `SnapshotIsolation` | not validated | first committer wins |
//! | `Serializable` | first committer wins | first committer wins |
//!
//! Read-only transactions never conflict: their reads came from a consistent
//! snapshot and they publish nothing.

use crate::transaction::TransactionContext;
use skewcheck_core::{IsolationLevel, Key};
use skewcheck_storage::VersionedStore;
use std::collections::{BTreeMap, HashMap};

/// Types of conflicts that can occur during transaction validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// A key read by the transaction was committed again since the read
    ReadWriteConflict {
        /// The key that has a conflict
        key: Key,
        /// Version recorded in the read set
        read_version: u64,
        /// Latest committed version at validation time
        current_version: u64,
    },

    /// A key written by the transaction was committed by someone else after
    /// the transaction's snapshot
    WriteWriteConflict {
        /// The key that has a conflict
        key: Key,
        /// Snapshot version of the transaction
        start_version: u64,
        /// Latest committed version at validation time
        current_version: u64,
    },
}

impl ConflictType {
    /// Key the conflict was detected on
    pub fn key(&self) -> &Key {
        match self {
            ConflictType::ReadWriteConflict { key, .. } => key,
            ConflictType::WriteWriteConflict { key, .. } => key,
        }
    }

    /// Short human-readable description
    pub fn describe(&self) -> String {
        match self {
            ConflictType::ReadWriteConflict {
                read_version,
                current_version,
                ..
            } => format!(
                "read-write conflict (read v{}, now v{})",
                read_version, current_version
            ),
            ConflictType::WriteWriteConflict {
                start_version,
                current_version,
                ..
            } => format!(
                "write-write conflict (snapshot v{}, now v{})",
                start_version, current_version
            ),
        }
    }
}

/// Result of transaction validation
///
/// Accumulates all conflicts found during validation.
/// A transaction commits only if is_valid() returns true.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    /// All conflicts detected during validation
    pub conflicts: Vec<ConflictType>,
}

impl ValidationResult {
    /// Create a successful validation result (no conflicts)
    pub fn ok() -> Self {
        ValidationResult {
            conflicts: Vec::new(),
        }
    }

    /// Create a validation result with a single conflict
    pub fn conflict(conflict: ConflictType) -> Self {
        ValidationResult {
            conflicts: vec![conflict],
        }
    }

    /// Check if validation passed (no conflicts)
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.conflicts.extend(other.conflicts);
    }

    /// Get the number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

/// Validate the read set against the latest committed versions
///
/// A key absent at read time was recorded with version 0; creating it
/// afterwards is a conflict too.
pub fn validate_read_set(read_set: &HashMap<Key, u64>, store: &VersionedStore) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for (key, read_version) in read_set {
        let current_version = store.latest_version(key);
        if current_version != *read_version {
            result.conflicts.push(ConflictType::ReadWriteConflict {
                key: key.clone(),
                read_version: *read_version,
                current_version,
            });
        }
    }

    result
}

/// Validate the write set against commits made after `start_version`
pub fn validate_write_set<V>(
    write_set: &BTreeMap<Key, V>,
    start_version: u64,
    store: &VersionedStore,
) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for key in write_set.keys() {
        let current_version = store.latest_version(key);
        if current_version > start_version {
            result.conflicts.push(ConflictType::WriteWriteConflict {
                key: key.clone(),
                start_version,
                current_version,
            });
        }
    }

    result
}

/// Validate a transaction per its isolation level
///
/// Must run under the manager's commit lock so that no commit lands between
/// validation and apply.
pub fn validate_transaction(txn: &TransactionContext, store: &VersionedStore) -> ValidationResult {
    if txn.is_read_only() {
        return ValidationResult::ok();
    }

    match txn.isolation {
        IsolationLevel::ReadCommitted => ValidationResult::ok(),
        IsolationLevel::SnapshotIsolation => {
            validate_write_set(&txn.write_set, txn.start_version, store)
        }
        IsolationLevel::Serializable => {
            let mut result = validate_read_set(&txn.read_set, store);
            result.merge(validate_write_set(&txn.write_set, txn.start_version, store));
            result
        }
    }
}
