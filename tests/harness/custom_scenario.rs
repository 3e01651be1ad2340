//! Custom Scenario Tests
//!
//! A scenario written outside the harness crate: two workers read the same
//! counter, meet, then both write back an increment. Every committed worker
//! must be reflected in the final count, so a store that lets both commit
//! loses an update.

use crate::common::*;
use skewcheck_harness::{Handshake, Scenario, Worker, WorkerError, WorkerReport};

struct ConcurrentIncrement {
    counter: Key,
}

impl ConcurrentIncrement {
    fn new() -> Self {
        Self {
            counter: Key::named(&ns("custom"), "test_increment", "n"),
        }
    }
}

impl<S: Session> Scenario<S> for ConcurrentIncrement {
    type Observation = i64;

    fn name(&self) -> &'static str {
        "concurrent-increment"
    }

    fn anomaly(&self) -> Anomaly {
        // The second writer's read is stale by the time it commits
        Anomaly::NonRepeatableRead
    }

    fn sessions_required(&self) -> usize {
        2
    }

    fn initial_state(&self) -> Vec<(Key, Record)> {
        vec![(self.counter.clone(), Record::with_count(0))]
    }

    fn workers<'a>(&'a mut self) -> Vec<Worker<'a, S, i64>> {
        let (first, second) = Handshake::pair();
        let counter = &self.counter;
        [("first", first), ("second", second)]
            .into_iter()
            .map(move |(role, party)| {
                Worker::new(role, move |session: &S| {
                    run_in_transaction(session, |txn| {
                        let seen = txn.get(counter)?.count;
                        party.arrive_and_wait();
                        txn.put(counter.clone(), Record::with_count(seen + 1))?;
                        Ok::<_, WorkerError>(seen)
                    })
                })
            })
            .collect()
    }

    fn verify(
        &self,
        session: &S,
        reports: &[WorkerReport<i64>],
    ) -> Result<Option<String>, WorkerError> {
        let committed = reports.iter().filter(|r| r.result.is_ok()).count() as i64;
        let count = run_in_transaction(session, |txn| {
            Ok::<_, WorkerError>(txn.get(&self.counter)?.count)
        })?;
        if count != committed {
            return Ok(Some(format!("{} commits, n={}", committed, count)));
        }
        Ok(None)
    }
}

#[test]
fn lost_update_detected_only_under_read_committed() {
    for level in LEVELS {
        let t = TestStore::new(level, 2);
        let runner = t.runner();
        let mut scenario = ConcurrentIncrement::new();

        match runner.run_once(&mut scenario) {
            Err(HarnessError::InvariantViolation {
                scenario, details, ..
            }) => {
                assert_eq!(level, IsolationLevel::ReadCommitted);
                assert_eq!(scenario, "concurrent-increment");
                assert_eq!(details, "2 commits, n=1");
            }
            Ok(outcome) => {
                assert_ne!(level, IsolationLevel::ReadCommitted);
                assert_eq!(outcome, IterationOutcome::Aborted { workers: 1 });
                assert_eq!(t.count(&scenario.counter), 1);
            }
            Err(other) => panic!("{}: unexpected error: {}", level, other),
        }
    }
}
