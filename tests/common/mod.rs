//! Shared helpers for the integration suites.

#![allow(dead_code)]

pub use skewcheck::{
    run_in_transaction, Anomaly, HarnessError, IsolationLevel, IterationOutcome, Key,
    MemorySession, MemoryStore, MemoryTransaction, Namespace, Record, ScenarioRunner, Session,
    Store, StoreError, StoreResult, Transaction,
};
use std::time::Duration;

/// A reference store with a fixed pool of sessions
pub struct TestStore {
    pub store: MemoryStore,
    pub sessions: Vec<MemorySession>,
}

impl TestStore {
    pub fn new(isolation: IsolationLevel, sessions: usize) -> Self {
        Self::with_latency(isolation, sessions, Duration::ZERO)
    }

    pub fn with_latency(isolation: IsolationLevel, sessions: usize, latency: Duration) -> Self {
        let store = MemoryStore::with_read_latency(isolation, latency);
        let sessions = (0..sessions).map(|_| store.connect().unwrap()).collect();
        Self { store, sessions }
    }

    pub fn runner(&self) -> ScenarioRunner<'_, MemorySession> {
        ScenarioRunner::new(&self.sessions).unwrap()
    }

    /// A clean session 0 followed by `faulty` sessions that inject `fault`
    ///
    /// Setup and verification run on session 0, so only workers placed on
    /// the later sessions see the fault.
    pub fn with_faults(&self, faulty: usize, fault: Fault) -> Vec<FaultySession> {
        (0..=faulty)
            .map(|i| FaultySession {
                inner: self.store.connect().unwrap(),
                fault: if i == 0 { Fault::None } else { fault },
            })
            .collect()
    }

    pub fn session(&self) -> &MemorySession {
        &self.sessions[0]
    }

    /// Latest committed counter under `key`
    pub fn count(&self, key: &Key) -> i64 {
        self.store.latest(key).unwrap().count
    }

    /// Blind-write `count` under each key
    pub fn seed(&self, entries: &[(&Key, i64)]) {
        let batch = entries
            .iter()
            .map(|(key, count)| ((*key).clone(), Record::with_count(*count)))
            .collect();
        self.session().put_multi(batch).unwrap();
    }
}

pub fn ns(name: &str) -> Namespace {
    Namespace::new(name)
}

pub fn key(name: &str) -> Key {
    Key::named(&ns("it"), "test_kind", name)
}

/// Every isolation level, weakest first
pub const LEVELS: [IsolationLevel; 3] = [
    IsolationLevel::ReadCommitted,
    IsolationLevel::SnapshotIsolation,
    IsolationLevel::Serializable,
];

/// Failure a [`FaultySession`] injects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    None,
    /// Every `begin` fails
    Begin,
    /// Commits that carry writes are refused for contention
    ContendWrites,
    /// Commits that carry writes fail with a backend error
    FailWrites,
}

/// Reference session with an injected failure
pub struct FaultySession {
    pub inner: MemorySession,
    pub fault: Fault,
}

pub struct FaultyTransaction {
    inner: MemoryTransaction,
    fault: Fault,
    written: Option<Key>,
}

impl Session for FaultySession {
    type Transaction = FaultyTransaction;

    fn begin(&self) -> StoreResult<FaultyTransaction> {
        if self.fault == Fault::Begin {
            return Err(StoreError::backend("unavailable"));
        }
        Ok(FaultyTransaction {
            inner: self.inner.begin()?,
            fault: self.fault,
            written: None,
        })
    }

    fn put_multi(&self, entries: Vec<(Key, Record)>) -> StoreResult<()> {
        self.inner.put_multi(entries)
    }
}

impl Transaction for FaultyTransaction {
    fn id(&self) -> u64 {
        self.inner.id()
    }

    fn get(&mut self, key: &Key) -> StoreResult<Record> {
        self.inner.get(key)
    }

    fn put(&mut self, key: Key, record: Record) -> StoreResult<()> {
        self.written = Some(key.clone());
        self.inner.put(key, record)
    }

    fn commit(self) -> StoreResult<u64> {
        match (self.fault, self.written) {
            (Fault::ContendWrites, Some(key)) => {
                self.inner.rollback();
                Err(StoreError::contention(key, "too much contention on these entities"))
            }
            (Fault::FailWrites, Some(_)) => {
                self.inner.rollback();
                Err(StoreError::backend("deadline exceeded"))
            }
            _ => self.inner.commit(),
        }
    }

    fn rollback(self) {
        self.inner.rollback()
    }
}
