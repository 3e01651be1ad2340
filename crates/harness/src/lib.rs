//! Isolation-anomaly harness
//!
//! Drives fixed, hand-coded transaction interleavings against any store
//! implementing the `skewcheck-core` facade and checks the invariants a
//! correctly isolated store must preserve:
//! - barrier: single-shot rendezvous pinning down cross-transaction order
//! - runner: one iteration of a scenario (setup, workers, verification)
//! - scenario: repeatable read, read skew (plain and bulk), write skew
//! - loader: batched dataset population for the bulk scenario
//! - driver: repeats a scenario until a limit, cancellation or a fatal error
//! - config: process configuration from TOML and the environment

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod barrier;
pub mod config;
pub mod driver;
pub mod error;
pub mod loader;
pub mod runner;
pub mod scenario;

pub use barrier::{Barrier, Handshake, Party, SignalOnDrop};
pub use config::HarnessConfig;
pub use driver::{Driver, DriverReport, Iterations};
pub use error::{HarnessError, HarnessResult, WorkerError};
pub use loader::{BulkLoader, LoadReport, BATCH_SIZE, PAYLOAD_SIZE};
pub use runner::{IterationOutcome, Scenario, ScenarioRunner, Worker, WorkerReport};
pub use scenario::{BulkReadSkew, ReadSkew, RepeatableRead, WriteSkew};
