//! Scenario runner
//!
//! Executes one iteration of a scenario:
//! 1. Reset the scenario state through one setup transaction on session 0
//! 2. Run every worker on its own scoped thread and its own session
//! 3. Collect per-worker outcomes (contention and other failures are
//!    resolved here, never retried)
//! 4. Let the scenario verify its invariant
//!
//! A reproduced anomaly comes back as [`HarnessError::InvariantViolation`];
//! deciding whether to stop is the caller's business.

use crate::error::{HarnessError, HarnessResult, WorkerError};
use skewcheck_core::{run_in_transaction, Anomaly, Key, Record, Session, StoreError, Transaction};
use std::thread;

/// Body of one worker, run on its own session
pub type WorkerBody<'a, S, O> = Box<dyn FnOnce(&S) -> Result<O, WorkerError> + Send + 'a>;

/// A scripted transaction role
pub struct Worker<'a, S, O> {
    /// Role name used in logs
    pub role: &'static str,
    /// Script
    pub body: WorkerBody<'a, S, O>,
}

impl<'a, S, O> Worker<'a, S, O> {
    /// Create a worker from a role name and a script
    pub fn new<F>(role: &'static str, body: F) -> Self
    where
        F: FnOnce(&S) -> Result<O, WorkerError> + Send + 'a,
    {
        Self {
            role,
            body: Box::new(body),
        }
    }
}

/// Outcome of one worker
#[derive(Debug, Clone)]
pub struct WorkerReport<O> {
    /// Worker index, also the index of its session
    pub index: usize,
    /// Role name
    pub role: &'static str,
    /// Observation on success
    pub result: Result<O, WorkerError>,
}

/// Outcome of an iteration whose invariant held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationOutcome {
    /// Every worker committed
    Passed,
    /// Some workers were refused for contention, none failed otherwise
    Aborted {
        /// Number of contention aborts
        workers: usize,
    },
    /// Some workers failed for a reason other than contention
    Failed {
        /// Number of failed workers
        workers: usize,
    },
}

impl IterationOutcome {
    fn from_reports<O>(reports: &[WorkerReport<O>]) -> Self {
        let aborted = reports
            .iter()
            .filter(|r| matches!(&r.result, Err(e) if e.is_contention()))
            .count();
        let failed = reports
            .iter()
            .filter(|r| matches!(&r.result, Err(e) if !e.is_contention()))
            .count();

        if failed > 0 {
            IterationOutcome::Failed { workers: failed }
        } else if aborted > 0 {
            IterationOutcome::Aborted { workers: aborted }
        } else {
            IterationOutcome::Passed
        }
    }
}

/// A fixed, hand-coded interleaving and its invariant
pub trait Scenario<S: Session> {
    /// Observation a worker reports on success
    type Observation: Send;

    /// Scenario name used in logs and errors
    fn name(&self) -> &'static str;

    /// Anomaly the scenario probes
    fn anomaly(&self) -> Anomaly;

    /// Minimum number of sessions the scenario needs
    fn sessions_required(&self) -> usize;

    /// Records written by the setup transaction
    fn initial_state(&self) -> Vec<(Key, Record)>;

    /// Workers of one iteration, with fresh barriers
    fn workers<'a>(&'a mut self) -> Vec<Worker<'a, S, Self::Observation>>;

    /// Check the invariant after every worker finished
    ///
    /// `session` is session 0, free for a verification transaction.
    /// Returns `Some(details)` describing the violating values when the
    /// invariant does not hold. Errors of the verification transaction itself
    /// are reported as `Err` and end the iteration as failed.
    fn verify(
        &self,
        session: &S,
        reports: &[WorkerReport<Self::Observation>],
    ) -> Result<Option<String>, WorkerError>;
}

/// Runs scenario iterations over a fixed set of sessions
pub struct ScenarioRunner<'s, S> {
    sessions: &'s [S],
}

impl<'s, S: Session> ScenarioRunner<'s, S> {
    /// Create a runner over `sessions`
    ///
    /// # Errors
    ///
    /// Fails if `sessions` is empty.
    pub fn new(sessions: &'s [S]) -> HarnessResult<Self> {
        if sessions.is_empty() {
            return Err(HarnessError::Session("runner needs at least one session".into()));
        }
        Ok(Self { sessions })
    }

    /// Sessions the runner drives
    pub fn sessions(&self) -> &'s [S] {
        self.sessions
    }

    /// Write the scenario's initial state in one transaction on session 0
    pub fn reset<Sc: Scenario<S>>(&self, scenario: &Sc) -> HarnessResult<()> {
        let initial = scenario.initial_state();
        run_in_transaction(&self.sessions[0], |txn| {
            for (key, record) in initial {
                txn.put(key, record)?;
            }
            Ok::<_, StoreError>(())
        })
        .map_err(|source| HarnessError::Setup {
            scenario: scenario.name(),
            source,
        })
    }

    /// Run one iteration of `scenario`
    ///
    /// # Errors
    ///
    /// - [`HarnessError::Setup`] if the initial state could not be written
    /// - [`HarnessError::InvariantViolation`] if the scenario reproduced its
    ///   anomaly
    /// - [`HarnessError::WorkerPanicked`] if a worker thread panicked
    pub fn run_once<Sc: Scenario<S>>(&self, scenario: &mut Sc) -> HarnessResult<IterationOutcome> {
        let name = scenario.name();
        let anomaly = scenario.anomaly();
        if self.sessions.len() < scenario.sessions_required() {
            return Err(HarnessError::Session(format!(
                "{} needs {} sessions, got {}",
                name,
                scenario.sessions_required(),
                self.sessions.len()
            )));
        }

        self.reset(scenario)?;

        let reports = self.run_workers(scenario.workers())?;
        let mut violations = Vec::new();
        for report in &reports {
            match &report.result {
                Ok(_) => tracing::debug!(scenario = name, role = report.role, "worker committed"),
                Err(WorkerError::Inconsistent(details)) => {
                    violations.push(format!("{}: {}", report.role, details))
                }
                Err(e) if e.is_contention() => tracing::warn!(
                    scenario = name,
                    role = report.role,
                    worker = report.index,
                    error = %e,
                    "transaction aborted"
                ),
                Err(e) => tracing::error!(
                    scenario = name,
                    role = report.role,
                    worker = report.index,
                    error = %e,
                    "transaction failed"
                ),
            }
        }
        if !violations.is_empty() {
            return Err(HarnessError::InvariantViolation {
                scenario: name,
                anomaly,
                details: violations.join("; "),
            });
        }

        match scenario.verify(&self.sessions[0], &reports) {
            Ok(Some(details)) => Err(HarnessError::InvariantViolation {
                scenario: name,
                anomaly,
                details,
            }),
            Ok(None) => Ok(IterationOutcome::from_reports(&reports)),
            Err(e) => {
                tracing::error!(scenario = name, error = %e, "verification failed");
                let failed = reports.iter().filter(|r| r.result.is_err()).count() + 1;
                Ok(IterationOutcome::Failed { workers: failed })
            }
        }
    }

    fn run_workers<O: Send>(
        &self,
        workers: Vec<Worker<'_, S, O>>,
    ) -> HarnessResult<Vec<WorkerReport<O>>> {
        let sessions = self.sessions;
        thread::scope(|scope| {
            let handles: Vec<_> = workers
                .into_iter()
                .enumerate()
                .map(|(index, worker)| {
                    let session = &sessions[index % sessions.len()];
                    let role = worker.role;
                    let handle = scope.spawn(move || (worker.body)(session));
                    (index, role, handle)
                })
                .collect();

            // Join every handle before looking at panics, otherwise the scope
            // re-raises the panic of any worker left unjoined.
            let joined: Vec<_> = handles
                .into_iter()
                .map(|(index, role, handle)| {
                    handle
                        .join()
                        .map(|result| WorkerReport {
                            index,
                            role,
                            result,
                        })
                        .map_err(|_| HarnessError::WorkerPanicked { role })
                })
                .collect();
            joined.into_iter().collect()
        })
    }
}

/// Counter stored under `key`
pub(crate) fn read_count<T: Transaction>(txn: &mut T, key: &Key) -> Result<i64, WorkerError> {
    Ok(txn.get(key)?.count)
}
