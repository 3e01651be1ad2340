//! Read-skew check over a large dataset
//!
//! Same interleaving as [`ReadSkew`], but x and y are the integer ids `1` and
//! `D - 1` of a dataset of `D` records written by the
//! [`BulkLoader`](crate::loader::BulkLoader). On backends that shard by key
//! range the two records land far apart, which is where contention aborts
//! show up. Those aborts are expected and non-fatal.

use super::read_skew::{ReadSkew, ReadSkewObservation};
use super::KIND_READ_SKEW;
use crate::error::{HarnessError, HarnessResult, WorkerError};
use crate::loader::{BulkLoader, LoadReport};
use crate::runner::{Scenario, Worker, WorkerReport};
use skewcheck_core::{Anomaly, Key, Namespace, Record, Session};

/// Dataset size the reference soak runs with
pub const DEFAULT_DATASET_SIZE: u64 = 1024 * 1024;

/// Read skew between ids `1` and `D - 1`
#[derive(Debug, Clone)]
pub struct BulkReadSkew {
    inner: ReadSkew,
    namespace: Namespace,
    dataset_size: u64,
}

impl BulkReadSkew {
    /// Scenario over a dataset of `dataset_size` records in `namespace`
    ///
    /// # Errors
    ///
    /// Fails if the dataset has fewer than 3 records (x and y would not be
    /// distinct interior ids).
    pub fn new(namespace: &Namespace, dataset_size: u64) -> HarnessResult<Self> {
        if dataset_size < 3 {
            return Err(HarnessError::config(format!(
                "dataset size must be at least 3, got {}",
                dataset_size
            )));
        }
        let last = i64::try_from(dataset_size - 1)
            .map_err(|_| HarnessError::config("dataset size does not fit an integer key"))?;

        let inner = ReadSkew::with_keys(
            "bulk-read-skew",
            Key::id(namespace, KIND_READ_SKEW, 1),
            Key::id(namespace, KIND_READ_SKEW, last),
        );
        Ok(Self {
            inner,
            namespace: namespace.clone(),
            dataset_size,
        })
    }

    /// Number of records in the dataset
    pub fn dataset_size(&self) -> u64 {
        self.dataset_size
    }

    /// Key of x (id 1)
    pub fn x(&self) -> &Key {
        self.inner.x()
    }

    /// Key of y (id `D - 1`)
    pub fn y(&self) -> &Key {
        self.inner.y()
    }

    /// Populate the dataset the scenario runs over
    pub fn load<S: Session>(&self, session: &S) -> HarnessResult<LoadReport> {
        BulkLoader::new(session, &self.namespace, KIND_READ_SKEW).load(self.dataset_size)
    }
}

impl<S: Session> Scenario<S> for BulkReadSkew {
    type Observation = ReadSkewObservation;

    fn name(&self) -> &'static str {
        <ReadSkew as Scenario<S>>::name(&self.inner)
    }

    fn anomaly(&self) -> Anomaly {
        Anomaly::ReadSkew
    }

    fn sessions_required(&self) -> usize {
        <ReadSkew as Scenario<S>>::sessions_required(&self.inner)
    }

    fn initial_state(&self) -> Vec<(Key, Record)> {
        <ReadSkew as Scenario<S>>::initial_state(&self.inner)
    }

    fn workers<'a>(&'a mut self) -> Vec<Worker<'a, S, ReadSkewObservation>> {
        <ReadSkew as Scenario<S>>::workers(&mut self.inner)
    }

    fn verify(
        &self,
        session: &S,
        reports: &[WorkerReport<ReadSkewObservation>],
    ) -> Result<Option<String>, WorkerError> {
        <ReadSkew as Scenario<S>>::verify(&self.inner, session, reports)
    }
}
