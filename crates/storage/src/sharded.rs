//! Sharded multi-version storage
//!
//! Every key maps to a chain of committed versions, so a transaction can read
//! the state as of its start version while later commits keep appending.
//!
//! # Design
//!
//! - DashMap: sharded by Namespace, lock-free reads
//! - FxHashMap: O(1) lookups within a shard
//! - VersionChain: ascending list of committed versions per key
//!
//! Versions are allocated by the caller (the transaction manager) under its
//! commit lock, so chains only ever grow at the tail.

use chrono::Utc;
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use skewcheck_core::{Key, Namespace, Record};
use std::sync::atomic::{AtomicU64, Ordering};

/// A record together with the version that committed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedRecord {
    /// Committed record
    pub record: Record,
    /// Commit version
    pub version: u64,
    /// Commit wall-clock time (unix seconds)
    pub timestamp: i64,
}

/// Committed versions of a single key, oldest first
#[derive(Debug, Clone, Default)]
pub struct VersionChain {
    versions: Vec<VersionedRecord>,
}

impl VersionChain {
    /// Latest committed version
    pub fn latest(&self) -> Option<&VersionedRecord> {
        self.versions.last()
    }

    /// Latest version visible at `max_version`
    pub fn at(&self, max_version: u64) -> Option<&VersionedRecord> {
        self.versions.iter().rev().find(|v| v.version <= max_version)
    }

    /// Append a new version
    ///
    /// A version not newer than the current tail replaces the tail, which
    /// keeps the chain strictly ascending.
    pub fn push(&mut self, versioned: VersionedRecord) {
        match self.versions.last_mut() {
            Some(tail) if tail.version >= versioned.version => *tail = versioned,
            _ => self.versions.push(versioned),
        }
    }

    /// Drop versions no snapshot at or above `horizon` can observe
    ///
    /// Keeps the newest version `<= horizon` and everything after it.
    /// Returns the number of versions removed.
    pub fn prune(&mut self, horizon: u64) -> usize {
        let visible = self.versions.iter().rposition(|v| v.version <= horizon);
        match visible {
            Some(idx) if idx > 0 => {
                self.versions.drain(..idx);
                idx
            }
            _ => 0,
        }
    }

    /// Number of retained versions
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether the chain holds no versions
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Per-namespace shard
#[derive(Debug, Default)]
pub struct Shard {
    pub(crate) data: FxHashMap<Key, VersionChain>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in this shard
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the shard holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Multi-version store, sharded by namespace
///
/// # Thread Safety
///
/// All operations are thread-safe:
/// - reads take a shard read guard only
/// - writes lock only the target namespace's shard
///
/// # Example
///
/// ```
/// use skewcheck_core::{Key, Namespace, Record};
/// use skewcheck_storage::VersionedStore;
///
/// let store = VersionedStore::new();
/// let key = Key::named(&Namespace::new("test"), "kind", "x");
///
/// let v1 = store.next_version();
/// store.put(key.clone(), Record::with_count(100), v1);
/// let v2 = store.next_version();
/// store.put(key.clone(), Record::with_count(0), v2);
///
/// assert_eq!(store.get_at(&key, v1).unwrap().record.count, 100);
/// assert_eq!(store.get(&key).unwrap().record.count, 0);
/// ```
pub struct VersionedStore {
    shards: DashMap<Namespace, Shard>,
    version: AtomicU64,
}

impl VersionedStore {
    /// Create new empty store at version 0
    pub fn new() -> Self {
        Self {
            shards: DashMap::new(),
            version: AtomicU64::new(0),
        }
    }

    /// Current global version
    #[inline]
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Increment version and return the new value
    #[inline]
    pub fn next_version(&self) -> u64 {
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Publish `version` as the current global version
    ///
    /// Called after a commit's writes are applied, so snapshots never observe
    /// a partially applied version.
    pub fn set_version(&self, version: u64) {
        self.version.store(version, Ordering::Release);
    }

    /// Number of shards (namespaces)
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Total number of keys across all shards
    pub fn total_entries(&self) -> usize {
        self.shards.iter().map(|entry| entry.value().len()).sum()
    }

    /// Latest committed version of `key`
    #[inline]
    pub fn get(&self, key: &Key) -> Option<VersionedRecord> {
        self.shards
            .get(&key.namespace)
            .and_then(|shard| shard.data.get(key).and_then(|c| c.latest().cloned()))
    }

    /// Version of `key` visible to a snapshot taken at `max_version`
    #[inline]
    pub fn get_at(&self, key: &Key, max_version: u64) -> Option<VersionedRecord> {
        self.shards
            .get(&key.namespace)
            .and_then(|shard| shard.data.get(key).and_then(|c| c.at(max_version).cloned()))
    }

    /// Commit version of the latest write to `key`, 0 if never written
    pub fn latest_version(&self, key: &Key) -> u64 {
        self.shards
            .get(&key.namespace)
            .and_then(|shard| shard.data.get(key).and_then(|c| c.latest().map(|v| v.version)))
            .unwrap_or(0)
    }

    /// Append a version of `key`
    pub fn put(&self, key: Key, record: Record, version: u64) {
        let versioned = VersionedRecord {
            record,
            version,
            timestamp: Utc::now().timestamp(),
        };
        self.shards
            .entry(key.namespace.clone())
            .or_insert_with(Shard::new)
            .data
            .entry(key)
            .or_default()
            .push(versioned);
    }

    /// Apply a batch of writes, all at `version`
    ///
    /// Returns the number of records written.
    pub fn apply_batch<I>(&self, writes: I, version: u64) -> usize
    where
        I: IntoIterator<Item = (Key, Record)>,
    {
        let timestamp = Utc::now().timestamp();
        let mut applied = 0;
        for (key, record) in writes {
            self.shards
                .entry(key.namespace.clone())
                .or_insert_with(Shard::new)
                .data
                .entry(key)
                .or_default()
                .push(VersionedRecord {
                    record,
                    version,
                    timestamp,
                });
            applied += 1;
        }
        applied
    }

    /// Prune the chains of `keys` below `horizon`
    ///
    /// Returns the number of versions removed.
    pub fn prune<'a, I>(&self, keys: I, horizon: u64) -> usize
    where
        I: IntoIterator<Item = &'a Key>,
    {
        let mut removed = 0;
        for key in keys {
            if let Some(mut shard) = self.shards.get_mut(&key.namespace) {
                if let Some(chain) = shard.data.get_mut(key) {
                    removed += chain.prune(horizon);
                }
            }
        }
        if removed > 0 {
            tracing::trace!(removed, horizon, "pruned record versions");
        }
        removed
    }

    /// Number of retained versions of `key`
    pub fn chain_len(&self, key: &Key) -> usize {
        self.shards
            .get(&key.namespace)
            .and_then(|shard| shard.data.get(key).map(|c| c.len()))
            .unwrap_or(0)
    }

    /// Number of keys in a namespace
    pub fn namespace_entry_count(&self, namespace: &Namespace) -> usize {
        self.shards
            .get(namespace)
            .map(|shard| shard.len())
            .unwrap_or(0)
    }

    /// Latest version of every key in a namespace, sorted by key
    pub fn list_namespace(&self, namespace: &Namespace) -> Vec<(Key, VersionedRecord)> {
        let mut entries: Vec<_> = self
            .shards
            .get(namespace)
            .map(|shard| {
                shard
                    .data
                    .iter()
                    .filter_map(|(k, c)| c.latest().map(|v| (k.clone(), v.clone())))
                    .collect()
            })
            .unwrap_or_default();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

impl Default for VersionedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for VersionedStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionedStore")
            .field("shard_count", &self.shard_count())
            .field("version", &self.version())
            .field("total_entries", &self.total_entries())
            .finish()
    }
}
