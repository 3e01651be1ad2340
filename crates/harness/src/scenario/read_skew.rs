//! Read-skew check
//!
//! `x = 100, y = 0`, invariant `x + y = 100`.
//!
//! ```text
//! A: begin, read x, [delay] ──┐                    ┌── [delay], read y, commit
//!                             handshake  B commits ┘
//! B: begin ───────────────────┘ read x, y; write x - 100, y + 100; commit
//! ```
//!
//! The only consistent observations for A are `(100, 0)` and `(0, 100)`.

use super::{KIND_READ_SKEW, TRANSFER_TOTAL};
use crate::barrier::{Barrier, Handshake};
use crate::error::WorkerError;
use crate::runner::{read_count, Scenario, Worker, WorkerReport};
use skewcheck_core::{run_in_transaction, Anomaly, Key, Namespace, Record, Session, Transaction};
use std::thread;
use std::time::Duration;

/// What each role of [`ReadSkew`] saw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSkewObservation {
    /// Reader's x (before the transfer) and y (after it)
    Reader {
        /// First read
        x: i64,
        /// Second read
        y: i64,
    },
    /// Pre-state the writer transferred from
    Writer {
        /// x before the transfer
        x: i64,
        /// y before the transfer
        y: i64,
    },
}

/// Reads x and y around a concurrent transfer
#[derive(Debug, Clone)]
pub struct ReadSkew {
    name: &'static str,
    x: Key,
    y: Key,
    reader_delay: Duration,
}

impl ReadSkew {
    /// Scenario over the named keys `"x"` and `"y"` of `namespace`
    pub fn new(namespace: &Namespace) -> Self {
        Self::with_keys(
            "read-skew",
            Key::named(namespace, KIND_READ_SKEW, "x"),
            Key::named(namespace, KIND_READ_SKEW, "y"),
        )
    }

    /// Scenario over arbitrary keys
    pub fn with_keys(name: &'static str, x: Key, y: Key) -> Self {
        Self {
            name,
            x,
            y,
            reader_delay: Duration::ZERO,
        }
    }

    /// Sleep this long after the reader's first read and again before its
    /// second one
    pub fn with_reader_delay(mut self, delay: Duration) -> Self {
        self.reader_delay = delay;
        self
    }

    /// Key of x
    pub fn x(&self) -> &Key {
        &self.x
    }

    /// Key of y
    pub fn y(&self) -> &Key {
        &self.y
    }
}

impl<S: Session> Scenario<S> for ReadSkew {
    type Observation = ReadSkewObservation;

    fn name(&self) -> &'static str {
        self.name
    }

    fn anomaly(&self) -> Anomaly {
        Anomaly::ReadSkew
    }

    fn sessions_required(&self) -> usize {
        2
    }

    fn initial_state(&self) -> Vec<(Key, Record)> {
        vec![
            (self.x.clone(), Record::with_count(TRANSFER_TOTAL)),
            (self.y.clone(), Record::with_count(0)),
        ]
    }

    fn workers<'a>(&'a mut self) -> Vec<Worker<'a, S, ReadSkewObservation>> {
        let (reader_side, writer_side) = Handshake::pair();
        let writer_done = Barrier::shared();
        let writer_signal = writer_done.signal_on_drop();
        let (x, y, delay) = (&self.x, &self.y, self.reader_delay);

        let reader = Worker::new("reader", move |session: &S| {
            run_in_transaction(session, |txn| {
                let x = read_count(txn, x)?;
                pause(delay);
                reader_side.arrive_and_wait();
                writer_done.wait();
                pause(delay);
                let y = read_count(txn, y)?;
                tracing::debug!(x, y, "reader: read");
                Ok(ReadSkewObservation::Reader { x, y })
            })
        });

        let writer = Worker::new("writer", move |session: &S| {
            let _done = writer_signal;
            run_in_transaction(session, |txn| {
                writer_side.arrive_and_wait();
                let x_count = read_count(txn, x)?;
                let y_count = read_count(txn, y)?;
                tracing::debug!(x = x_count, y = y_count, "writer: read");
                if x_count + y_count != TRANSFER_TOTAL {
                    return Err(WorkerError::Inconsistent(format!(
                        "writer saw x={} y={}",
                        x_count, y_count
                    )));
                }
                txn.put(x.clone(), Record::with_count(x_count - TRANSFER_TOTAL))?;
                txn.put(y.clone(), Record::with_count(y_count + TRANSFER_TOTAL))?;
                Ok(ReadSkewObservation::Writer {
                    x: x_count,
                    y: y_count,
                })
            })
        });

        vec![reader, writer]
    }

    fn verify(
        &self,
        _session: &S,
        reports: &[WorkerReport<ReadSkewObservation>],
    ) -> Result<Option<String>, WorkerError> {
        for report in reports {
            if let Ok(ReadSkewObservation::Reader { x, y }) = report.result {
                if x + y != TRANSFER_TOTAL {
                    return Ok(Some(format!("reader saw x={} y={}", x, y)));
                }
            }
        }
        Ok(None)
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
