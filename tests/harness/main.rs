//! Harness Integration Tests
//!
//! Drives every scenario against the reference store at each isolation level
//! and checks that anomalies are reported exactly where the level permits
//! them.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test harness
//!
//! # Scenario matrix only
//! cargo test --test harness scenarios::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod barrier;
mod custom_scenario;
mod driver;
mod faults;
mod scenarios;
