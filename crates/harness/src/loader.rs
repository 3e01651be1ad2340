//! Bulk loader
//!
//! Populates `D` records with sequential integer ids `0..D`, each holding
//! `count = 100` and a zero-filled payload, in batches of [`BATCH_SIZE`].
//! Keys are deterministic, so reloading simply overwrites: the loader is
//! idempotent and has no checkpointing.

use crate::error::{HarnessError, HarnessResult};
use skewcheck_core::{Key, Namespace, Record, Session};

/// Records per `put_multi` call
pub const BATCH_SIZE: usize = 100;

/// Payload size of every loaded record, in bytes
pub const PAYLOAD_SIZE: usize = 1024;

/// Counter every loaded record starts with
pub const INITIAL_COUNT: i64 = 100;

/// Summary of a completed load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Records written
    pub records: u64,
    /// Batches written
    pub batches: u64,
}

/// Batched dataset writer
pub struct BulkLoader<'a, S> {
    session: &'a S,
    namespace: Namespace,
    kind: String,
    batch_size: usize,
}

impl<'a, S: Session> BulkLoader<'a, S> {
    /// Loader writing into `kind` of `namespace` through `session`
    pub fn new(session: &'a S, namespace: &Namespace, kind: &str) -> Self {
        Self {
            session,
            namespace: namespace.clone(),
            kind: kind.to_string(),
            batch_size: BATCH_SIZE,
        }
    }

    /// Override the batch size (minimum 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Write ids `0..size`
    ///
    /// # Errors
    ///
    /// [`HarnessError::BulkLoad`] on the first failing batch. Batches before
    /// it stay written.
    pub fn load(&self, size: u64) -> HarnessResult<LoadReport> {
        let size = i64::try_from(size)
            .map_err(|_| HarnessError::config("dataset size does not fit an integer key"))?;
        let batch_size = i64::try_from(self.batch_size).unwrap_or(i64::MAX);

        tracing::info!(
            namespace = %self.namespace,
            kind = %self.kind,
            records = size,
            batch_size,
            "loading dataset"
        );

        let mut report = LoadReport {
            records: 0,
            batches: 0,
        };
        let mut first_id = 0i64;
        while first_id < size {
            let end = first_id.saturating_add(batch_size).min(size);
            let batch: Vec<(Key, Record)> = (first_id..end)
                .map(|id| {
                    (
                        Key::id(&self.namespace, &self.kind, id),
                        Record::with_payload(INITIAL_COUNT, PAYLOAD_SIZE),
                    )
                })
                .collect();

            self.session
                .put_multi(batch)
                .map_err(|source| HarnessError::BulkLoad { first_id, source })?;

            report.records += (end - first_id) as u64;
            report.batches += 1;
            tracing::debug!(first_id, last_id = end - 1, "batch written");
            first_id = end;
        }

        tracing::info!(records = report.records, batches = report.batches, "dataset loaded");
        Ok(report)
    }
}
