//! Core types and traits for skewcheck
//!
//! This crate defines the store client facade the harness talks to:
//! - Namespace / Key: addressing of records (kind + name or integer id)
//! - Record: the entity stored under a key (counter + opaque payload)
//! - IsolationLevel / Anomaly: what a store advertises and what a scenario probes
//! - StoreError: error taxonomy with contention classification
//! - Traits: Store, Session, Transaction and `run_in_transaction`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod isolation;
pub mod record;
pub mod traits;
pub mod types;

pub use error::{StoreError, StoreResult};
pub use isolation::{Anomaly, IsolationLevel};
pub use record::Record;
pub use traits::{run_in_transaction, Session, Store, Transaction};
pub use types::{Key, KeyName, Namespace};
