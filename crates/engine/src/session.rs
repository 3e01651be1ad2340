//! Client sessions

use crate::database::StoreInner;
use crate::transaction::MemoryTransaction;
use skewcheck_core::{Key, Record, Session, StoreError, StoreResult};
use std::sync::Arc;

/// An independent connection to a [`MemoryStore`](crate::MemoryStore)
///
/// Sessions hold no per-connection state besides their id; transactions
/// begun from different sessions run fully concurrently.
pub struct MemorySession {
    inner: Arc<StoreInner>,
    id: u64,
}

impl MemorySession {
    pub(crate) fn new(inner: Arc<StoreInner>, id: u64) -> Self {
        Self { inner, id }
    }

    /// Session identifier, unique per store
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Session for MemorySession {
    type Transaction = MemoryTransaction;

    fn begin(&self) -> StoreResult<MemoryTransaction> {
        let ctx = self
            .inner
            .manager
            .begin(&self.inner.storage, self.inner.isolation);
        tracing::trace!(session = self.id, txn_id = ctx.txn_id, "begin");
        Ok(MemoryTransaction::new(Arc::clone(&self.inner), ctx))
    }

    fn put_multi(&self, entries: Vec<(Key, Record)>) -> StoreResult<()> {
        if entries.is_empty() {
            return Err(StoreError::InvalidState("empty batch".into()));
        }
        let count = entries.len();
        let version = self.inner.manager.apply_blind(&self.inner.storage, entries);
        tracing::trace!(session = self.id, count, version, "batch written");
        Ok(())
    }
}

impl std::fmt::Debug for MemorySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySession").field("id", &self.id).finish()
    }
}
