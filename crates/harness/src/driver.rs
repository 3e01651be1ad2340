//! Driver loop
//!
//! Repeats one scenario and tallies iteration outcomes. Contention aborts and
//! other per-transaction failures end only their iteration; any
//! [`HarnessError`] ends the loop.

use crate::error::HarnessResult;
use crate::runner::{IterationOutcome, Scenario, ScenarioRunner};
use skewcheck_core::Session;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// How many iterations to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iterations {
    /// Stop after this many iterations
    Limited(u64),
    /// Run until cancelled or a fatal error (soak mode)
    Unbounded,
}

impl Iterations {
    fn allows(&self, completed: u64) -> bool {
        match self {
            Iterations::Limited(limit) => completed < *limit,
            Iterations::Unbounded => true,
        }
    }
}

impl From<Option<u64>> for Iterations {
    fn from(limit: Option<u64>) -> Self {
        limit.map_or(Iterations::Unbounded, Iterations::Limited)
    }
}

/// Tally of a finished driver run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverReport {
    /// Iterations executed
    pub iterations: u64,
    /// Iterations in which every worker committed
    pub passed: u64,
    /// Iterations ended by contention aborts
    pub aborted: u64,
    /// Iterations ended by other transaction errors
    pub failed: u64,
}

impl DriverReport {
    fn record(&mut self, outcome: IterationOutcome) {
        self.iterations += 1;
        match outcome {
            IterationOutcome::Passed => self.passed += 1,
            IterationOutcome::Aborted { .. } => self.aborted += 1,
            IterationOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Repeats a scenario over a runner
pub struct Driver<'s, S> {
    runner: ScenarioRunner<'s, S>,
    iterations: Iterations,
    cancel: Arc<AtomicBool>,
}

impl<'s, S: Session> Driver<'s, S> {
    /// Driver over `runner`
    pub fn new(runner: ScenarioRunner<'s, S>, iterations: Iterations) -> Self {
        Self {
            runner,
            iterations,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop when `flag` becomes true
    ///
    /// The flag is checked between iterations; a running iteration completes.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    /// Flag that stops the driver when set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Run `scenario` until the iteration limit, cancellation or a fatal
    /// error
    ///
    /// # Errors
    ///
    /// The first fatal [`HarnessError`](crate::HarnessError) of any
    /// iteration, typically an invariant violation.
    pub fn run<Sc: Scenario<S>>(&self, scenario: &mut Sc) -> HarnessResult<DriverReport> {
        let name = scenario.name();
        let mut report = DriverReport::default();

        while self.iterations.allows(report.iterations) {
            if self.cancel.load(Ordering::SeqCst) {
                tracing::info!(scenario = name, iterations = report.iterations, "cancelled");
                break;
            }

            let step = report.iterations + 1;
            let outcome = match self.runner.run_once(scenario) {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(scenario = name, step, error = %e, "fatal");
                    return Err(e);
                }
            };
            match outcome {
                IterationOutcome::Passed => tracing::info!(scenario = name, step, "invariant holds"),
                IterationOutcome::Aborted { workers } => {
                    tracing::warn!(scenario = name, step, workers, "iteration aborted by contention")
                }
                IterationOutcome::Failed { workers } => {
                    tracing::error!(scenario = name, step, workers, "iteration failed")
                }
            }
            report.record(outcome);
        }

        tracing::info!(
            scenario = name,
            iterations = report.iterations,
            passed = report.passed,
            aborted = report.aborted,
            failed = report.failed,
            "driver finished"
        );
        Ok(report)
    }
}
