//! Harness configuration
//!
//! Read once at startup, from (lowest to highest precedence):
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. the `DATASTORE_PROJECT_ID` / `DATASTORE_NAMESPACE` environment variables
//! 4. command-line flags (applied by the binary)

use crate::error::{HarnessError, HarnessResult};
use crate::scenario::bulk_read_skew::DEFAULT_DATASET_SIZE;
use crate::scenario::write_skew::DEFAULT_WORKERS;
use serde::{Deserialize, Serialize};
use skewcheck_core::{IsolationLevel, Namespace};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the target project id
pub const ENV_PROJECT_ID: &str = "DATASTORE_PROJECT_ID";

/// Environment variable holding the namespace
pub const ENV_NAMESPACE: &str = "DATASTORE_NAMESPACE";

/// Reader delay of the plain read-skew soak, in milliseconds
pub const DEFAULT_READER_DELAY_MS: u64 = 3000;

/// Process configuration
///
/// # Example
///
/// ```toml
/// project_id = "test"
/// namespace = "test"
/// isolation = "serializable"
///
/// # Omit for an unbounded soak run
/// iterations = 100
///
/// write_skew_workers = 10
/// dataset_size = 1048576
/// reader_delay_ms = 3000
/// read_latency_ms = 0
/// # seed = 42
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Target project or account identifier
    pub project_id: String,
    /// Namespace every scenario key lives in
    pub namespace: String,
    /// Isolation level of the reference store
    pub isolation: IsolationLevel,
    /// Iterations per scenario run, unbounded when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iterations: Option<u64>,
    /// Concurrent workers of the write-skew scenario
    pub write_skew_workers: usize,
    /// Records loaded for the bulk read-skew scenario
    pub dataset_size: u64,
    /// Reader delay of the plain read-skew scenario, in milliseconds
    pub reader_delay_ms: u64,
    /// Artificial latency of every transactional read, in milliseconds
    pub read_latency_ms: u64,
    /// Seed of the write-skew role assignment, random when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            namespace: String::new(),
            isolation: IsolationLevel::default(),
            iterations: None,
            write_skew_workers: DEFAULT_WORKERS,
            dataset_size: DEFAULT_DATASET_SIZE,
            reader_delay_ms: DEFAULT_READER_DELAY_MS,
            read_latency_ms: 0,
            seed: None,
        }
    }
}

impl HarnessConfig {
    /// Read and parse config from a file path
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HarnessError::config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: HarnessConfig = toml::from_str(&content).map_err(|e| {
            HarnessError::config(format!(
                "failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override project id and namespace from `lookup`
    pub fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_id) = lookup(ENV_PROJECT_ID) {
            self.project_id = project_id;
        }
        if let Some(namespace) = lookup(ENV_NAMESPACE) {
            self.namespace = namespace;
        }
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] naming the first invalid field.
    pub fn validate(&self) -> HarnessResult<()> {
        if self.write_skew_workers == 0 {
            return Err(HarnessError::config("write_skew_workers must be at least 1"));
        }
        if self.dataset_size < 3 {
            return Err(HarnessError::config(format!(
                "dataset_size must be at least 3, got {}",
                self.dataset_size
            )));
        }
        if i64::try_from(self.dataset_size).is_err() {
            return Err(HarnessError::config("dataset_size does not fit an integer key"));
        }
        Ok(())
    }

    /// Namespace as a typed value
    pub fn namespace(&self) -> Namespace {
        Namespace::new(self.namespace.clone())
    }

    /// Reader delay of the plain read-skew scenario
    pub fn reader_delay(&self) -> Duration {
        Duration::from_millis(self.reader_delay_ms)
    }

    /// Artificial read latency of the reference store
    pub fn read_latency(&self) -> Duration {
        Duration::from_millis(self.read_latency_ms)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> HarnessResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| HarnessError::config(format!("failed to serialize config: {}", e)))
    }
}
