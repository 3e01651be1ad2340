//! Store handle
//!
//! `MemoryStore` is cheap to clone; every clone and every session shares the
//! same versioned storage and transaction manager.

use crate::session::MemorySession;
use skewcheck_concurrency::TransactionManager;
use skewcheck_core::{IsolationLevel, Key, Namespace, Record, Store, StoreResult};
use skewcheck_storage::VersionedStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// State shared by a store, its sessions and their transactions
pub(crate) struct StoreInner {
    pub(crate) storage: VersionedStore,
    pub(crate) manager: TransactionManager,
    pub(crate) isolation: IsolationLevel,
    pub(crate) read_latency: Duration,
    next_session_id: AtomicU64,
}

/// In-memory transactional store
///
/// # Example
///
/// ```
/// use skewcheck_core::{run_in_transaction, IsolationLevel, Key, Namespace, Record};
/// use skewcheck_core::{Store, Transaction};
/// use skewcheck_engine::MemoryStore;
///
/// let store = MemoryStore::new(IsolationLevel::Serializable);
/// let session = store.connect().unwrap();
/// let key = Key::named(&Namespace::new("doc"), "counter", "x");
///
/// run_in_transaction(&session, |txn| txn.put(key.clone(), Record::with_count(1))).unwrap();
/// assert_eq!(store.latest(&key).unwrap().count, 1);
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl MemoryStore {
    /// Create an empty store at `isolation`
    pub fn new(isolation: IsolationLevel) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                storage: VersionedStore::new(),
                manager: TransactionManager::new(),
                isolation,
                read_latency: Duration::ZERO,
                next_session_id: AtomicU64::new(1),
            }),
        }
    }

    /// Create an empty store whose transactional reads sleep for `latency`
    ///
    /// The delay sits between the snapshot being taken and the read being
    /// served, which widens the window in which concurrent transactions
    /// overlap.
    pub fn with_read_latency(isolation: IsolationLevel, latency: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                storage: VersionedStore::new(),
                manager: TransactionManager::new(),
                isolation,
                read_latency: latency,
                next_session_id: AtomicU64::new(1),
            }),
        }
    }

    /// Latest committed record under `key`, outside of any transaction
    pub fn latest(&self, key: &Key) -> Option<Record> {
        self.inner.storage.get(key).map(|v| v.record)
    }

    /// Latest committed record of every key in `namespace`, sorted by key
    pub fn dump(&self, namespace: &Namespace) -> Vec<(Key, Record)> {
        self.inner
            .storage
            .list_namespace(namespace)
            .into_iter()
            .map(|(key, versioned)| (key, versioned.record))
            .collect()
    }

    /// Number of keys stored in `namespace`
    pub fn len(&self, namespace: &Namespace) -> usize {
        self.inner.storage.namespace_entry_count(namespace)
    }

    /// Whether `namespace` holds no keys
    pub fn is_empty(&self, namespace: &Namespace) -> bool {
        self.len(namespace) == 0
    }

    /// Current published version
    pub fn version(&self) -> u64 {
        self.inner.storage.version()
    }

    /// Number of transactions not yet committed or rolled back
    pub fn active_transactions(&self) -> usize {
        self.inner.manager.active_transactions()
    }

    /// Retained versions of `key`
    pub fn chain_len(&self, key: &Key) -> usize {
        self.inner.storage.chain_len(key)
    }
}

impl Store for MemoryStore {
    type Session = MemorySession;

    fn connect(&self) -> StoreResult<MemorySession> {
        let id = self.inner.next_session_id.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session = id, isolation = %self.inner.isolation, "session opened");
        Ok(MemorySession::new(Arc::clone(&self.inner), id))
    }

    fn isolation(&self) -> IsolationLevel {
        self.inner.isolation
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("isolation", &self.inner.isolation)
            .field("read_latency", &self.inner.read_latency)
            .field("storage", &self.inner.storage)
            .finish()
    }
}
