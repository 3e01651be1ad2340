//! In-memory reference store for skewcheck
//!
//! Wires the versioned storage and the OCC transaction manager behind the
//! store client facade:
//! - MemoryStore: shared state, advertised isolation, session factory
//! - MemorySession: independent client connection
//! - MemoryTransaction: one transaction attempt
//!
//! The store exists so the harness can run without an external backend and
//! so each isolation level's anomalies can be reproduced on demand.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod session;
pub mod transaction;

pub use database::MemoryStore;
pub use session::MemorySession;
pub use transaction::MemoryTransaction;
