//! Fault Handling Tests
//!
//! Contention aborts and other transaction failures end only their
//! iteration; a broken setup transaction ends the run.

use crate::common::*;
use skewcheck::{BulkReadSkew, Driver, DriverReport, Iterations, ReadSkew};

#[test]
fn read_skew_writer_contention_is_not_fatal() {
    let t = TestStore::new(IsolationLevel::Serializable, 0);
    let sessions = t.with_faults(1, Fault::ContendWrites);
    let runner = ScenarioRunner::new(&sessions).unwrap();
    let mut scenario = ReadSkew::new(&ns("faults"));

    assert_eq!(
        runner.run_once(&mut scenario).unwrap(),
        IterationOutcome::Aborted { workers: 1 }
    );
    // The refused transfer left the setup state in place
    assert_eq!(t.count(scenario.x()), 100);
    assert_eq!(t.count(scenario.y()), 0);
}

#[test]
fn bulk_read_skew_writer_contention_is_not_fatal() {
    let t = TestStore::new(IsolationLevel::SnapshotIsolation, 0);
    let sessions = t.with_faults(1, Fault::ContendWrites);
    let mut scenario = BulkReadSkew::new(&ns("faults"), 300).unwrap();
    assert_eq!(scenario.load(&sessions[0]).unwrap().records, 300);

    let runner = ScenarioRunner::new(&sessions).unwrap();
    assert_eq!(
        runner.run_once(&mut scenario).unwrap(),
        IterationOutcome::Aborted { workers: 1 }
    );
    assert_eq!(t.count(scenario.y()), 0);
}

#[test]
fn driver_tallies_contention_aborts() {
    let t = TestStore::new(IsolationLevel::Serializable, 0);
    let sessions = t.with_faults(1, Fault::ContendWrites);
    let driver = Driver::new(ScenarioRunner::new(&sessions).unwrap(), Iterations::Limited(4));

    let report = driver.run(&mut ReadSkew::new(&ns("faults"))).unwrap();
    assert_eq!(
        report,
        DriverReport {
            iterations: 4,
            passed: 0,
            aborted: 4,
            failed: 0,
        }
    );
}

#[test]
fn driver_tallies_other_failures() {
    let t = TestStore::new(IsolationLevel::Serializable, 0);
    let sessions = t.with_faults(1, Fault::FailWrites);
    let driver = Driver::new(ScenarioRunner::new(&sessions).unwrap(), Iterations::Limited(3));

    let report = driver.run(&mut ReadSkew::new(&ns("faults"))).unwrap();
    assert_eq!(report.iterations, 3);
    assert_eq!(report.failed, 3);
    assert_eq!(report.aborted, 0);
}

#[test]
fn failing_setup_ends_the_run() {
    let t = TestStore::new(IsolationLevel::Serializable, 0);
    let mut sessions = t.with_faults(1, Fault::None);
    sessions[0].fault = Fault::Begin;
    let driver = Driver::new(ScenarioRunner::new(&sessions).unwrap(), Iterations::Unbounded);

    match driver.run(&mut ReadSkew::new(&ns("faults"))) {
        Err(HarnessError::Setup { scenario, source }) => {
            assert_eq!(scenario, "read-skew");
            assert!(!source.is_contention());
        }
        other => panic!("expected setup failure, got {:?}", other),
    }
}
