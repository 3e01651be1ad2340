//! Record stored under a key

use serde::{Deserialize, Serialize};

/// A stored entity
///
/// `count` is the counter every scenario invariant is expressed over. `data`
/// is an opaque payload; it is empty except in the bulk dataset, where it
/// pads records to a fixed size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Counter attribute
    pub count: i64,
    /// Opaque payload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
}

impl Record {
    /// Record with a counter and no payload
    pub fn with_count(count: i64) -> Self {
        Self {
            count,
            data: Vec::new(),
        }
    }

    /// Record with a counter and a zero-filled payload of `size` bytes
    pub fn with_payload(count: i64, size: usize) -> Self {
        Self {
            count,
            data: vec![0u8; size],
        }
    }

    /// Size of the payload in bytes
    pub fn payload_len(&self) -> usize {
        self.data.len()
    }
}
