//! Transaction manager for coordinating commit operations
//!
//! Provides atomic commit by orchestrating:
//! 1. Validation (per isolation level)
//! 2. Storage application (all writes at one commit version)
//! 3. Publication (global version bump, making the writes visible)
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. acquire commit_lock
//! 2. TransactionContext::commit() - Active → Validating → Committed | Aborted
//! 3. IF conflicts: release snapshot and return error
//! 4. commit_version = current version + 1
//! 5. apply_batch() - append writes to version chains
//! 6. set_version(commit_version) - writes become visible
//! 7. release snapshot, prune superseded versions of the written keys
//! ```
//!
//! Snapshots are tracked so pruning never drops a version an active
//! transaction can still read.

use crate::{CommitError, TransactionContext};
use parking_lot::Mutex;
use skewcheck_core::{IsolationLevel, Key, Record, StoreResult};
use skewcheck_storage::VersionedStore;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Manages transaction lifecycle and atomic commits
///
/// # Thread Safety
///
/// The commit operation is serialized via an internal lock to prevent TOCTOU
/// (time-of-check-to-time-of-use) races between validation and storage
/// application. No other transaction can modify storage between the time we
/// validate and the time we publish our writes.
pub struct TransactionManager {
    /// Next transaction ID
    next_txn_id: AtomicU64,

    /// Commit serialization lock
    ///
    /// Held across validate → apply → publish.
    commit_lock: Mutex<()>,

    /// Snapshot version → number of open transactions reading at it
    active_snapshots: Mutex<BTreeMap<u64, usize>>,
}

impl TransactionManager {
    /// Create a new transaction manager
    pub fn new() -> Self {
        TransactionManager {
            next_txn_id: AtomicU64::new(1),
            commit_lock: Mutex::new(()),
            active_snapshots: Mutex::new(BTreeMap::new()),
        }
    }

    /// Allocate next transaction ID
    pub fn next_txn_id(&self) -> u64 {
        self.next_txn_id.fetch_add(1, Ordering::SeqCst)
    }

    /// Start a transaction at the current published version
    ///
    /// The snapshot is registered under the same lock the pruning horizon is
    /// computed under, so a version this transaction can see is never pruned.
    pub fn begin(&self, store: &VersionedStore, isolation: IsolationLevel) -> TransactionContext {
        let txn_id = self.next_txn_id();
        let mut snapshots = self.active_snapshots.lock();
        let start_version = store.version();
        *snapshots.entry(start_version).or_insert(0) += 1;
        drop(snapshots);

        let mut txn = TransactionContext::new(txn_id, start_version, isolation);
        txn.snapshot_registered = true;
        tracing::trace!(txn_id, start_version, %isolation, "transaction started");
        txn
    }

    /// Commit a transaction atomically
    ///
    /// # Returns
    /// - Ok(commit_version) on success. A read-only transaction returns its
    ///   start version and publishes nothing.
    /// - Err(CommitError) if validation fails or the transaction is not active
    pub fn commit(
        &self,
        txn: &mut TransactionContext,
        store: &VersionedStore,
    ) -> Result<u64, CommitError> {
        let _commit_guard = self.commit_lock.lock();

        if let Err(e) = txn.commit(store) {
            tracing::debug!(
                txn_id = txn.txn_id,
                isolation = %txn.isolation,
                error = %e,
                "transaction aborted at commit"
            );
            self.release(txn);
            return Err(e);
        }

        let writes = txn.take_writes();
        if writes.is_empty() {
            self.release(txn);
            return Ok(txn.start_version);
        }

        let commit_version = store.version() + 1;
        let keys: Vec<Key> = writes.keys().cloned().collect();
        let applied = store.apply_batch(writes, commit_version);
        store.set_version(commit_version);
        self.release(txn);

        let horizon = self.prune_horizon(store);
        store.prune(keys.iter(), horizon);

        tracing::trace!(
            txn_id = txn.txn_id,
            commit_version,
            applied,
            "transaction committed"
        );
        Ok(commit_version)
    }

    /// Abort a transaction, discarding its writes
    ///
    /// # Errors
    /// Fails if the transaction already committed or aborted.
    pub fn abort(&self, txn: &mut TransactionContext, reason: impl Into<String>) -> StoreResult<()> {
        let result = txn.mark_aborted(reason);
        self.release(txn);
        result
    }

    /// Drop the snapshot registration of `txn`
    ///
    /// Idempotent; called on commit, abort and when a handle is dropped.
    pub fn release(&self, txn: &mut TransactionContext) {
        if !txn.snapshot_registered {
            return;
        }
        txn.snapshot_registered = false;

        let mut snapshots = self.active_snapshots.lock();
        if let Some(count) = snapshots.get_mut(&txn.start_version) {
            *count -= 1;
            if *count == 0 {
                snapshots.remove(&txn.start_version);
            }
        }
    }

    /// Apply writes outside of any transaction
    ///
    /// The batch lands atomically at a fresh commit version. Used for bulk
    /// loading; nothing is validated.
    pub fn apply_blind(&self, store: &VersionedStore, writes: Vec<(Key, Record)>) -> u64 {
        let _commit_guard = self.commit_lock.lock();

        let commit_version = store.version() + 1;
        let keys: Vec<Key> = writes.iter().map(|(k, _)| k.clone()).collect();
        store.apply_batch(writes, commit_version);
        store.set_version(commit_version);

        let horizon = self.prune_horizon(store);
        store.prune(keys.iter(), horizon);
        commit_version
    }

    /// Number of open transactions
    pub fn active_transactions(&self) -> usize {
        self.active_snapshots.lock().values().sum()
    }

    /// Oldest snapshot version still held by an open transaction
    pub fn oldest_active_snapshot(&self) -> Option<u64> {
        self.active_snapshots.lock().keys().next().copied()
    }

    fn prune_horizon(&self, store: &VersionedStore) -> u64 {
        self.oldest_active_snapshot()
            .unwrap_or_else(|| store.version())
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("next_txn_id", &self.next_txn_id.load(Ordering::Relaxed))
            .field("active_transactions", &self.active_transactions())
            .finish()
    }
}
