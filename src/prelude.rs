//! Convenient imports for skewcheck.
//!
//! ```no_run
//! use skewcheck::prelude::*;
//!
//! let store = MemoryStore::new(IsolationLevel::Serializable);
//! let session = store.connect()?;
//! # Ok::<(), StoreError>(())
//! ```

// Store facade
pub use skewcheck_core::{
    IsolationLevel, Key, Namespace, Record, Session, Store, StoreError, Transaction,
};

// Reference store
pub use skewcheck_engine::MemoryStore;

// Harness
pub use skewcheck_harness::{
    BulkReadSkew, Driver, HarnessError, IterationOutcome, Iterations, ReadSkew, RepeatableRead,
    ScenarioRunner, WriteSkew,
};
