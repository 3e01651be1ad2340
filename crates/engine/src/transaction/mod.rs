//! Transaction handles
//!
//! This module provides:
//! - MemoryTransaction: wrapper over a TransactionContext implementing the
//!   facade's Transaction trait
//! - Snapshot release on drop, so an abandoned handle never pins old versions

pub mod context;

pub use context::MemoryTransaction;
