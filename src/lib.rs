//! # skewcheck
//!
//! Isolation-anomaly harness for transactional key-value stores.
//!
//! skewcheck drives fixed, hand-coded interleavings of concurrent
//! transactions and checks the invariants a correctly isolated store must
//! preserve. A broken invariant is reported as a typed
//! [`HarnessError::InvariantViolation`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use skewcheck::prelude::*;
//!
//! let store = MemoryStore::new(IsolationLevel::ReadCommitted);
//! let sessions = vec![store.connect()?, store.connect()?];
//! let runner = ScenarioRunner::new(&sessions)?;
//!
//! let mut scenario = ReadSkew::new(&Namespace::new("demo"));
//! match runner.run_once(&mut scenario) {
//!     Err(HarnessError::InvariantViolation { details, .. }) => println!("{}", details),
//!     other => println!("{:?}", other),
//! }
//! # Ok::<(), HarnessError>(())
//! ```
//!
//! ## Scenarios
//!
//! - [`RepeatableRead`] - two reads of one key around a committed increment
//! - [`ReadSkew`] - reads of two keys around a committed transfer
//! - [`BulkReadSkew`] - the same over the extremes of a loaded dataset
//! - [`WriteSkew`] - guarded increments of two counters racing freely
//!
//! ## Stores
//!
//! Any backend implementing [`Store`], [`Session`] and [`Transaction`] can be
//! checked. [`MemoryStore`] is an in-memory MVCC reference store whose
//! isolation level is chosen at construction.

#![warn(missing_docs)]

pub mod prelude;

pub use skewcheck_core::{
    run_in_transaction, Anomaly, IsolationLevel, Key, KeyName, Namespace, Record, Session,
    Store, StoreError, StoreResult, Transaction,
};
pub use skewcheck_engine::{MemorySession, MemoryStore, MemoryTransaction};
pub use skewcheck_harness::{
    Barrier, BulkLoader, BulkReadSkew, Driver, DriverReport, HarnessConfig, HarnessError,
    HarnessResult, IterationOutcome, Iterations, LoadReport, ReadSkew, RepeatableRead, Scenario,
    ScenarioRunner, WorkerError, WriteSkew,
};
