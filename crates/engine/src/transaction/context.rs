//! Transaction wrapper implementing the facade's Transaction trait

use crate::database::StoreInner;
use skewcheck_concurrency::TransactionContext;
use skewcheck_core::{Key, Record, StoreError, StoreResult, Transaction};
use std::sync::Arc;
use std::thread;

/// One transaction attempt against a [`MemoryStore`](crate::MemoryStore)
///
/// Consumed by `commit` or `rollback`. A handle dropped without either is
/// rolled back.
pub struct MemoryTransaction {
    inner: Arc<StoreInner>,
    ctx: TransactionContext,
}

impl MemoryTransaction {
    pub(crate) fn new(inner: Arc<StoreInner>, ctx: TransactionContext) -> Self {
        Self { inner, ctx }
    }

    /// Snapshot version the transaction reads at
    pub fn start_version(&self) -> u64 {
        self.ctx.start_version
    }
}

impl Transaction for MemoryTransaction {
    fn id(&self) -> u64 {
        self.ctx.txn_id
    }

    fn get(&mut self, key: &Key) -> StoreResult<Record> {
        if !self.inner.read_latency.is_zero() {
            thread::sleep(self.inner.read_latency);
        }
        self.ctx.get(key, &self.inner.storage)
    }

    fn put(&mut self, key: Key, record: Record) -> StoreResult<()> {
        self.ctx.put(key, record)
    }

    fn commit(mut self) -> StoreResult<u64> {
        self.inner
            .manager
            .commit(&mut self.ctx, &self.inner.storage)
            .map_err(StoreError::from)
    }

    fn rollback(mut self) {
        if self.ctx.can_rollback() {
            // Only fails on a closed transaction, ruled out above
            let _ = self.inner.manager.abort(&mut self.ctx, "rollback");
        }
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        if self.ctx.can_rollback() {
            let _ = self.inner.manager.abort(&mut self.ctx, "dropped");
        } else {
            self.inner.manager.release(&mut self.ctx);
        }
    }
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("txn_id", &self.ctx.txn_id)
            .field("start_version", &self.ctx.start_version)
            .field("status", &self.ctx.status)
            .finish()
    }
}
