//! Store client facade
//!
//! The harness only ever talks to a backend through these traits, so any
//! transactional key-value store (a cloud datastore client, the in-memory
//! reference engine, a test double) can be plugged in underneath.
//!
//! The facade never retries. A commit failure is returned to the caller as
//! is, which is what lets the harness reason about contention behaviour.

use crate::error::{StoreError, StoreResult};
use crate::isolation::IsolationLevel;
use crate::record::Record;
use crate::types::Key;

/// A transactional key-value backend
///
/// Thread safety: a store is shared by every worker of a scenario, so
/// implementations must be `Send + Sync`.
pub trait Store: Send + Sync {
    /// Session type produced by [`Store::connect`]
    type Session: Session;

    /// Open a new, independent client session
    ///
    /// Each call must return a session that does not share request
    /// queuing with earlier sessions, so that transactions started from
    /// different sessions are genuinely concurrent.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    fn connect(&self) -> StoreResult<Self::Session>;

    /// Isolation level the backend advertises
    fn isolation(&self) -> IsolationLevel;
}

/// A long-lived client connection
pub trait Session: Send + Sync {
    /// Transaction handle type produced by [`Session::begin`]
    type Transaction: Transaction;

    /// Start a new transaction bound to this session
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses to open a transaction.
    fn begin(&self) -> StoreResult<Self::Transaction>;

    /// Upsert a batch of records outside of any transaction
    ///
    /// Used by the bulk loader. Existing records under the same keys are
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if any record of the batch could not be written.
    fn put_multi(&self, entries: Vec<(Key, Record)>) -> StoreResult<()>;
}

/// Handle to one logical transaction attempt
///
/// A handle is owned by exactly one worker and is consumed by
/// [`Transaction::commit`] or [`Transaction::rollback`].
pub trait Transaction: Send {
    /// Backend-assigned transaction identifier
    fn id(&self) -> u64;

    /// Read the record stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if nothing is stored under `key`.
    fn get(&mut self, key: &Key) -> StoreResult<Record>;

    /// Buffer an upsert of `record` under `key`
    ///
    /// The write becomes visible to other transactions only on commit.
    fn put(&mut self, key: Key, record: Record) -> StoreResult<()>;

    /// Commit all buffered writes atomically
    ///
    /// Returns the commit version on success.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Contention`] if the backend refuses the commit
    /// because of conflicting concurrent access. No writes are applied.
    fn commit(self) -> StoreResult<u64>;

    /// Discard all buffered writes
    fn rollback(self);
}

/// Run `body` inside a transaction on `session`
///
/// Commits when `body` returns `Ok`, rolls back when it returns `Err`. A
/// failed commit is returned as is; there is no retry loop, because a retried
/// attempt would not reproduce the interleaving under test.
///
/// # Example
///
/// ```ignore
/// let x = run_in_transaction(&session, |txn| {
///     let x = txn.get(&key)?;
///     txn.put(key.clone(), Record::with_count(x.count + 1))?;
///     Ok::<_, StoreError>(x.count)
/// })?;
/// ```
pub fn run_in_transaction<S, T, E, F>(session: &S, body: F) -> Result<T, E>
where
    S: Session + ?Sized,
    E: From<StoreError>,
    F: FnOnce(&mut S::Transaction) -> Result<T, E>,
{
    let mut txn = session.begin()?;
    match body(&mut txn) {
        Ok(value) => {
            txn.commit()?;
            Ok(value)
        }
        Err(e) => {
            txn.rollback();
            Err(e)
        }
    }
}
