//! Concurrency layer for the reference store
//!
//! This crate implements optimistic concurrency control (OCC) with:
//! - TransactionContext: read/write set tracking
//! - Snapshot reads at the transaction's start version
//! - Conflict detection at commit time, per isolation level
//! - TransactionManager: serialized commit and snapshot tracking

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod manager;
pub mod transaction;
pub mod validation;

pub use manager::TransactionManager;
pub use transaction::{CommitError, TransactionContext, TransactionStatus};
pub use validation::{
    validate_read_set, validate_transaction, validate_write_set, ConflictType, ValidationResult,
};
