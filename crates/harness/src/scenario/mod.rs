//! Anomaly scenarios
//!
//! | Scenario | Kind | Keys | Initial state | Invariant |
//! |---|---|---|---|---|
//! | [`RepeatableRead`] | `test_read_skew` | `"x"` | `x = 0` | reader's two reads of x equal |
//! | [`ReadSkew`] | `test_read_skew` | `"x"`, `"y"` | `x = 100, y = 0` | reader's x + y = 100 |
//! | [`BulkReadSkew`] | `test_read_skew` | ids `1`, `D - 1` | `x = 100, y = 0` | reader's x + y = 100 |
//! | [`WriteSkew`] | `test_write_skew` | `"id1"`, `"id2"` | `id1 = 0, id2 = 0` | final id1 + id2 < 2 |

pub mod bulk_read_skew;
pub mod read_skew;
pub mod repeatable_read;
pub mod write_skew;

pub use bulk_read_skew::BulkReadSkew;
pub use read_skew::{ReadSkew, ReadSkewObservation};
pub use repeatable_read::{RepeatableRead, RepeatableReadObservation};
pub use write_skew::{WriteSkew, WriteSkewObservation};

/// Kind shared by the repeatable-read and read-skew scenarios
pub const KIND_READ_SKEW: &str = "test_read_skew";

/// Kind of the write-skew scenario
pub const KIND_WRITE_SKEW: &str = "test_write_skew";

/// Sum of x and y every consistent read-skew state satisfies
pub const TRANSFER_TOTAL: i64 = 100;
