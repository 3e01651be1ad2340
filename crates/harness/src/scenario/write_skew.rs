//! Write-skew check
//!
//! `id1 = 0, id2 = 0`. Each of N workers is randomly assigned one counter,
//! reads both, and increments its own only if `id1 + id2 < 1`. Workers race
//! freely; only the store's concurrency control orders them.
//!
//! Serially, at most one increment ever lands, so the final sum must stay
//! below 2. Two workers with different counters that both read `(0, 0)` and
//! both commit are a write skew.

use super::KIND_WRITE_SKEW;
use crate::error::WorkerError;
use crate::runner::{read_count, Scenario, Worker, WorkerReport};
use rand::Rng;
use skewcheck_core::{run_in_transaction, Anomaly, Key, Namespace, Record, Session, Transaction};

/// Number of concurrent workers of the reference scenario
pub const DEFAULT_WORKERS: usize = 10;

/// Sum of the two counters no serial execution reaches
pub const THRESHOLD: i64 = 2;

/// What one write-skew worker did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSkewObservation {
    /// Counter the worker was assigned, 0 for id1 and 1 for id2
    pub target: usize,
    /// id1 as read
    pub id1: i64,
    /// id2 as read
    pub id2: i64,
    /// Whether the worker wrote its increment
    pub wrote: bool,
}

/// N guarded increments of two counters
#[derive(Debug)]
pub struct WriteSkew<R> {
    counters: [Key; 2],
    workers: usize,
    rng: R,
}

impl<R: Rng> WriteSkew<R> {
    /// `workers` concurrent workers over `namespace`, roles drawn from `rng`
    pub fn new(namespace: &Namespace, workers: usize, rng: R) -> Self {
        Self {
            counters: [
                Key::named(namespace, KIND_WRITE_SKEW, "id1"),
                Key::named(namespace, KIND_WRITE_SKEW, "id2"),
            ],
            workers,
            rng,
        }
    }

    /// Keys of id1 and id2
    pub fn counters(&self) -> &[Key; 2] {
        &self.counters
    }

    /// Number of workers per iteration
    pub fn worker_count(&self) -> usize {
        self.workers
    }
}

impl<S: Session, R: Rng> Scenario<S> for WriteSkew<R> {
    type Observation = WriteSkewObservation;

    fn name(&self) -> &'static str {
        "write-skew"
    }

    fn anomaly(&self) -> Anomaly {
        Anomaly::WriteSkew
    }

    fn sessions_required(&self) -> usize {
        self.workers
    }

    fn initial_state(&self) -> Vec<(Key, Record)> {
        self.counters
            .iter()
            .map(|key| (key.clone(), Record::with_count(0)))
            .collect()
    }

    fn workers<'a>(&'a mut self) -> Vec<Worker<'a, S, WriteSkewObservation>> {
        let counters = &self.counters;
        (0..self.workers)
            .map(|worker| {
                let target = self.rng.gen_range(0..2);
                let role = if target == 0 { "id1++" } else { "id2++" };
                Worker::new(role, move |session: &S| {
                    run_in_transaction(session, |txn| {
                        let id1 = read_count(txn, &counters[0])?;
                        let id2 = read_count(txn, &counters[1])?;
                        if id1 + id2 >= 1 {
                            tracing::debug!(worker, id1, id2, "nothing to do");
                            return Ok(WriteSkewObservation {
                                target,
                                id1,
                                id2,
                                wrote: false,
                            });
                        }

                        let current = if target == 0 { id1 } else { id2 };
                        txn.put(counters[target].clone(), Record::with_count(current + 1))?;
                        tracing::debug!(worker, id1, id2, role, "increment");
                        Ok(WriteSkewObservation {
                            target,
                            id1,
                            id2,
                            wrote: true,
                        })
                    })
                })
            })
            .collect()
    }

    fn verify(
        &self,
        session: &S,
        _reports: &[WorkerReport<WriteSkewObservation>],
    ) -> Result<Option<String>, WorkerError> {
        let [id1_key, id2_key] = &self.counters;
        let (id1, id2) = run_in_transaction(session, |txn| {
            let id1 = read_count(txn, id1_key)?;
            let id2 = read_count(txn, id2_key)?;
            Ok::<_, WorkerError>((id1, id2))
        })?;

        tracing::debug!(id1, id2, "final state");
        if id1 + id2 >= THRESHOLD {
            Ok(Some(format!("id1={} id2={}", id1, id2)))
        } else {
            Ok(None)
        }
    }
}
