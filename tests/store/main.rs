//! Reference Store Integration Tests
//!
//! Tests for the in-memory store through the public facade: visibility per
//! isolation level, commit-time validation, and MVCC invariants under
//! concurrency.

#[path = "../common/mod.rs"]
mod common;

mod mvcc_invariants;
