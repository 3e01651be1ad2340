//! Repeatable-read check
//!
//! ```text
//! A: begin, read x ──┐                       ┌── read x again, commit
//!                    handshake    B commits ─┘
//! B: begin ──────────┘ read x, write x + 1, commit
//! ```
//!
//! Reads do not block writes, so B always gets to commit while A is open. A
//! store with snapshot reads must still hand A the same value twice.

use super::KIND_READ_SKEW;
use crate::barrier::{Barrier, Handshake};
use crate::error::WorkerError;
use crate::runner::{read_count, Scenario, Worker, WorkerReport};
use skewcheck_core::{run_in_transaction, Anomaly, Key, Namespace, Record, Session, Transaction};

/// What each role of [`RepeatableRead`] saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatableReadObservation {
    /// Reader's first and second read of x
    Reads {
        /// Before the writer committed
        first: i64,
        /// After the writer committed
        second: i64,
    },
    /// Value the writer committed
    Wrote(i64),
}

/// Re-reads x around a concurrent increment
#[derive(Debug, Clone)]
pub struct RepeatableRead {
    x: Key,
    y: Key,
}

impl RepeatableRead {
    /// Scenario over `namespace`
    pub fn new(namespace: &Namespace) -> Self {
        Self {
            x: Key::named(namespace, KIND_READ_SKEW, "x"),
            y: Key::named(namespace, KIND_READ_SKEW, "y"),
        }
    }
}

impl<S: Session> Scenario<S> for RepeatableRead {
    type Observation = RepeatableReadObservation;

    fn name(&self) -> &'static str {
        "repeatable-read"
    }

    fn anomaly(&self) -> Anomaly {
        Anomaly::NonRepeatableRead
    }

    fn sessions_required(&self) -> usize {
        2
    }

    fn initial_state(&self) -> Vec<(Key, Record)> {
        vec![
            (self.x.clone(), Record::with_count(0)),
            (self.y.clone(), Record::with_count(0)),
        ]
    }

    fn workers<'a>(&'a mut self) -> Vec<Worker<'a, S, RepeatableReadObservation>> {
        let (reader_side, writer_side) = Handshake::pair();
        let writer_done = Barrier::shared();
        let writer_signal = writer_done.signal_on_drop();
        let x = &self.x;

        let reader = Worker::new("reader", move |session: &S| {
            run_in_transaction(session, |txn| {
                let first = read_count(txn, x)?;
                tracing::debug!(x = first, "reader: first read");
                reader_side.arrive_and_wait();
                writer_done.wait();
                let second = read_count(txn, x)?;
                tracing::debug!(x = second, "reader: second read");
                Ok(RepeatableReadObservation::Reads { first, second })
            })
        });

        let writer = Worker::new("writer", move |session: &S| {
            let _done = writer_signal;
            run_in_transaction(session, |txn| {
                writer_side.arrive_and_wait();
                let current = read_count(txn, x)?;
                txn.put(x.clone(), Record::with_count(current + 1))?;
                tracing::debug!(x = current + 1, "writer: write");
                Ok::<_, WorkerError>(RepeatableReadObservation::Wrote(current + 1))
            })
        });

        vec![reader, writer]
    }

    fn verify(
        &self,
        _session: &S,
        reports: &[WorkerReport<RepeatableReadObservation>],
    ) -> Result<Option<String>, WorkerError> {
        for report in reports {
            if let Ok(RepeatableReadObservation::Reads { first, second }) = report.result {
                if first != second {
                    return Ok(Some(format!("reader saw x={} then x={}", first, second)));
                }
            }
        }
        Ok(None)
    }
}
