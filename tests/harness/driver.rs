//! Driver Tests
//!
//! Iteration limits, cancellation from another thread, and fatal stops.

use crate::common::*;
use skewcheck::{Driver, DriverReport, Iterations, ReadSkew, RepeatableRead};
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

#[test]
fn limited_run_tallies_every_iteration() {
    let t = TestStore::new(IsolationLevel::SnapshotIsolation, 2);
    let driver = Driver::new(t.runner(), Iterations::Limited(6));

    let report = driver.run(&mut ReadSkew::new(&ns("drv"))).unwrap();
    assert_eq!(
        report,
        DriverReport {
            iterations: 6,
            passed: 6,
            aborted: 0,
            failed: 0,
        }
    );
}

#[test]
fn unbounded_run_stops_when_cancelled() {
    let t = TestStore::new(IsolationLevel::Serializable, 2);
    let driver = Driver::new(t.runner(), Iterations::Unbounded);
    let cancel = driver.cancel_flag();

    let report = thread::scope(|s| {
        s.spawn(move || {
            thread::sleep(Duration::from_millis(50));
            cancel.store(true, Ordering::SeqCst);
        });
        driver.run(&mut RepeatableRead::new(&ns("drv"))).unwrap()
    });

    assert!(report.iterations > 0);
    assert_eq!(report.iterations, report.passed);
    assert_eq!(t.store.active_transactions(), 0);
}

#[test]
fn unbounded_run_stops_at_first_violation() {
    let t = TestStore::new(IsolationLevel::ReadCommitted, 2);
    let driver = Driver::new(t.runner(), Iterations::from(None::<u64>));

    let err = driver.run(&mut ReadSkew::new(&ns("drv"))).unwrap_err();
    assert!(err.is_violation());
    assert_eq!(err.to_string(), "read-skew: read skew detected: reader saw x=100 y=100");
}
