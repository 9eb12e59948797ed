//! ID type wrappers for type safety.

mod id_macro;

use serde::{Deserialize, Serialize};

use id_macro::impl_remote_handle;

/// Server-side staging context of a single upload.
///
/// Single-use: valid from `open_batch` until the batch is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(u64);

/// Handle of one uploaded chunk inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(u64);

impl_remote_handle!(BatchId, ChunkId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_round_trip_raw_value() {
        let batch = BatchId::new(42);
        assert_eq!(batch.get(), 42);
        assert_eq!(u64::from(ChunkId::from(7)), 7);
    }

    #[test]
    fn test_handles_serialize_as_plain_integers() {
        let json = serde_json::to_string(&vec![ChunkId::new(1), ChunkId::new(2)]).unwrap();
        assert_eq!(json, "[1,2]");

        let batch: BatchId = serde_json::from_str("9").unwrap();
        assert_eq!(batch, BatchId::new(9));
    }
}
