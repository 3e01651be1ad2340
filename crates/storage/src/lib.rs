//! Storage layer for the reference store
//!
//! This crate implements the multi-version storage backend with:
//! - VersionedStore: DashMap of per-namespace shards
//! - Version chains per key for snapshot reads
//! - Global version counter with AtomicU64
//! - Version pruning below the oldest live snapshot

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sharded;

pub use sharded::{Shard, VersionChain, VersionedRecord, VersionedStore};
