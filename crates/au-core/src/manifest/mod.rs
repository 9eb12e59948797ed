//! Commit manifests.
//!
//! A manifest is the ordered list of operations applied atomically when a
//! batch is committed. An upload commits exactly two operations:
//!
//! ```text
//! CreateAsset { key, content_type }
//! SetAssetContent { key, content_encoding: "identity", chunk_ids, sha256 }
//! ```
//!
//! For a key that does not exist yet, the create must come first in the same
//! commit, otherwise the store rejects the content assignment.

use serde::{Deserialize, Serialize};

use crate::asset::ContentKey;
use crate::checksum::Sha256Digest;
use crate::ids::ChunkId;

/// Content encoding meaning "stored bytes are the file bytes".
pub const IDENTITY_ENCODING: &str = "identity";

/// One operation of the remote store's commit contract.
///
/// The uploader only emits `CreateAsset` and `SetAssetContent`; the rest are
/// part of the contract and honored by stores implementing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BatchOperation {
    CreateAsset {
        key: ContentKey,
        content_type: String,
    },
    SetAssetContent {
        key: ContentKey,
        content_encoding: String,
        chunk_ids: Vec<ChunkId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sha256: Option<Sha256Digest>,
    },
    UnsetAssetContent {
        key: ContentKey,
        content_encoding: String,
    },
    DeleteAsset {
        key: ContentKey,
    },
    Clear,
}

impl BatchOperation {
    pub fn key(&self) -> Option<&ContentKey> {
        match self {
            BatchOperation::CreateAsset { key, .. }
            | BatchOperation::SetAssetContent { key, .. }
            | BatchOperation::UnsetAssetContent { key, .. }
            | BatchOperation::DeleteAsset { key } => Some(key),
            BatchOperation::Clear => None,
        }
    }

    /// Short operation name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            BatchOperation::CreateAsset { .. } => "create_asset",
            BatchOperation::SetAssetContent { .. } => "set_asset_content",
            BatchOperation::UnsetAssetContent { .. } => "unset_asset_content",
            BatchOperation::DeleteAsset { .. } => "delete_asset",
            BatchOperation::Clear => "clear",
        }
    }
}

/// Ordered operations submitted with a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationManifest(Vec<BatchOperation>);

impl OperationManifest {
    /// Manifest making `chunk_ids` visible as the content of a new asset `key`.
    pub fn for_upload(
        key: &ContentKey,
        content_type: &str,
        chunk_ids: Vec<ChunkId>,
        sha256: Option<Sha256Digest>,
    ) -> Self {
        Self(vec![
            BatchOperation::CreateAsset {
                key: key.clone(),
                content_type: content_type.to_string(),
            },
            BatchOperation::SetAssetContent {
                key: key.clone(),
                content_encoding: IDENTITY_ENCODING.to_string(),
                chunk_ids,
                sha256,
            },
        ])
    }

    pub fn from_operations(operations: Vec<BatchOperation>) -> Self {
        Self(operations)
    }

    pub fn operations(&self) -> &[BatchOperation] {
        &self.0
    }

    pub fn into_operations(self) -> Vec<BatchOperation> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Chunk ids referenced by every `SetAssetContent` operation, in order.
    pub fn referenced_chunk_ids(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.0
            .iter()
            .flat_map(|op| {
                let ids: &[ChunkId] = match op {
                    BatchOperation::SetAssetContent { chunk_ids, .. } => chunk_ids,
                    _ => &[],
                };
                ids
            })
            .copied()
    }
}
