//! Scenario Matrix Tests
//!
//! Each built-in scenario at each isolation level.

use crate::common::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use skewcheck::{BulkReadSkew, ReadSkew, RepeatableRead, WriteSkew};
use std::time::Duration;

/// Run `iterations` times; the first violation's anomaly and details
fn first_violation<F>(iterations: usize, mut step: F) -> Option<(Anomaly, String)>
where
    F: FnMut() -> Result<IterationOutcome, HarnessError>,
{
    for _ in 0..iterations {
        match step() {
            Ok(_) => {}
            Err(HarnessError::InvariantViolation {
                anomaly, details, ..
            }) => return Some((anomaly, details)),
            Err(other) => panic!("unexpected error: {}", other),
        }
    }
    None
}

// ============================================================================
// Repeatable read
// ============================================================================

#[test]
fn repeatable_read_matrix() {
    for level in LEVELS {
        let t = TestStore::new(level, 2);
        let runner = t.runner();
        let mut scenario = RepeatableRead::new(&ns("rr"));

        let violation = first_violation(3, || runner.run_once(&mut scenario));
        if level.prevents(Anomaly::NonRepeatableRead) {
            assert!(violation.is_none(), "{}: {:?}", level, violation);
        } else {
            let (anomaly, details) = violation.expect("read committed must repeat the anomaly");
            assert_eq!(anomaly, Anomaly::NonRepeatableRead);
            assert_eq!(details, "reader saw x=0 then x=1");
        }
    }
}

#[test]
fn repeatable_read_resets_state_between_iterations() {
    let t = TestStore::new(IsolationLevel::Serializable, 2);
    let runner = t.runner();
    let mut scenario = RepeatableRead::new(&ns("rr"));
    let x = Key::named(&ns("rr"), "test_read_skew", "x");

    for _ in 0..5 {
        assert_eq!(runner.run_once(&mut scenario).unwrap(), IterationOutcome::Passed);
        assert_eq!(t.count(&x), 1);
    }
}

// ============================================================================
// Read skew
// ============================================================================

#[test]
fn read_skew_matrix() {
    for level in LEVELS {
        let t = TestStore::new(level, 2);
        let runner = t.runner();
        let mut scenario = ReadSkew::new(&ns("rs"));

        let violation = first_violation(3, || runner.run_once(&mut scenario));
        if level.prevents(Anomaly::ReadSkew) {
            assert!(violation.is_none(), "{}: {:?}", level, violation);
            assert_eq!(t.count(scenario.x()) + t.count(scenario.y()), 100);
        } else {
            let (anomaly, details) = violation.expect("read committed must skew");
            assert_eq!(anomaly, Anomaly::ReadSkew);
            assert_eq!(details, "reader saw x=100 y=100");
        }
    }
}

#[test]
fn read_skew_reader_delay_does_not_change_outcome() {
    let t = TestStore::new(IsolationLevel::SnapshotIsolation, 2);
    let runner = t.runner();
    let mut scenario = ReadSkew::new(&ns("rs")).with_reader_delay(Duration::from_millis(10));
    assert_eq!(runner.run_once(&mut scenario).unwrap(), IterationOutcome::Passed);
}

#[test]
fn bulk_read_skew_matrix() {
    for level in LEVELS {
        let t = TestStore::new(level, 2);
        let mut scenario = BulkReadSkew::new(&ns("bulk"), 300).unwrap();
        let report = scenario.load(t.session()).unwrap();
        assert_eq!(report.records, 300);
        assert_eq!(report.batches, 3);

        let runner = t.runner();
        let violation = first_violation(2, || runner.run_once(&mut scenario));
        assert_eq!(violation.is_some(), !level.prevents(Anomaly::ReadSkew), "{}", level);
        assert_eq!(t.store.len(&ns("bulk")), 300);
    }
}

// ============================================================================
// Write skew
// ============================================================================

#[test]
fn write_skew_holds_on_serializable_store() {
    let t = TestStore::with_latency(IsolationLevel::Serializable, 6, Duration::from_millis(2));
    let runner = t.runner();
    let mut scenario = WriteSkew::new(&ns("ws"), 6, StdRng::seed_from_u64(5));

    let violation = first_violation(8, || runner.run_once(&mut scenario));
    assert!(violation.is_none(), "{:?}", violation);
    let [id1, id2] = scenario.counters();
    assert!(t.count(id1) + t.count(id2) < 2);
}

#[test]
fn write_skew_detected_on_snapshot_store() {
    let t = TestStore::with_latency(IsolationLevel::SnapshotIsolation, 4, Duration::from_millis(20));
    let runner = t.runner();
    let mut scenario = WriteSkew::new(&ns("ws"), 4, StdRng::seed_from_u64(3));

    let (anomaly, details) = first_violation(20, || runner.run_once(&mut scenario))
        .expect("write skew never reproduced on a snapshot store");
    assert_eq!(anomaly, Anomaly::WriteSkew);
    assert!(details.starts_with("id1="), "{}", details);
}

#[test]
fn write_skew_needs_a_session_per_worker() {
    let t = TestStore::new(IsolationLevel::Serializable, 2);
    let runner = t.runner();
    let mut scenario = WriteSkew::new(&ns("ws"), 5, StdRng::seed_from_u64(0));
    assert!(matches!(
        runner.run_once(&mut scenario),
        Err(HarnessError::Session(_))
    ));
}
