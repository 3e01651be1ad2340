//! Isolation levels and the anomalies they forbid

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Isolation anomaly probed by a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anomaly {
    /// Re-reading a key inside one transaction yields a different value
    NonRepeatableRead,
    /// Two reads in one transaction observe different committed states
    ReadSkew,
    /// Disjoint writes based on overlapping reads jointly break an invariant
    WriteSkew,
}

impl std::fmt::Display for Anomaly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Anomaly::NonRepeatableRead => write!(f, "non-repeatable read"),
            Anomaly::ReadSkew => write!(f, "read skew"),
            Anomaly::WriteSkew => write!(f, "write skew"),
        }
    }
}

/// Isolation level a store advertises
///
/// Levels are ordered weakest to strongest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationLevel {
    /// Every read sees the latest committed value
    ReadCommitted,
    /// Reads come from a snapshot; only write-write conflicts abort
    #[serde(alias = "snapshot")]
    SnapshotIsolation,
    /// Reads come from a snapshot; read sets are validated at commit
    #[default]
    Serializable,
}

impl IsolationLevel {
    /// Whether a store at this level must prevent `anomaly`
    pub fn prevents(&self, anomaly: Anomaly) -> bool {
        match anomaly {
            Anomaly::NonRepeatableRead | Anomaly::ReadSkew => {
                *self >= IsolationLevel::SnapshotIsolation
            }
            Anomaly::WriteSkew => *self == IsolationLevel::Serializable,
        }
    }

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "read-committed",
            IsolationLevel::SnapshotIsolation => "snapshot",
            IsolationLevel::Serializable => "serializable",
        }
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IsolationLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read-committed" | "read_committed" | "rc" => Ok(IsolationLevel::ReadCommitted),
            "snapshot" | "snapshot-isolation" | "snapshot_isolation" | "si" => {
                Ok(IsolationLevel::SnapshotIsolation)
            }
            "serializable" | "ser" => Ok(IsolationLevel::Serializable),
            other => Err(format!(
                "unknown isolation level '{}', expected read-committed, snapshot or serializable",
                other
            )),
        }
    }
}
