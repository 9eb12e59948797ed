use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tracing::debug;

use au_core::checksum::Sha256Digest;
use au_core::manifest::{BatchOperation, IDENTITY_ENCODING};
use au_core::ports::{AssetStorePort, StoreError};
use au_core::{BatchId, CallerIdentity, ChunkId, ContentKey, OperationManifest};

/// Committed content of an asset in one encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    pub content_type: String,
    pub content: Bytes,
    pub sha256: Sha256Digest,
}

#[derive(Debug, Clone)]
struct AssetRecord {
    content_type: String,
    encodings: BTreeMap<String, Encoding>,
}

#[derive(Debug, Clone)]
struct Encoding {
    content: Bytes,
    sha256: Sha256Digest,
}

#[derive(Debug)]
struct StoredChunk {
    batch: BatchId,
    content: Bytes,
}

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    open_batches: HashSet<BatchId>,
    chunks: HashMap<ChunkId, StoredChunk>,
    assets: BTreeMap<ContentKey, AssetRecord>,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn drop_batch(&mut self, batch: BatchId) {
        self.open_batches.remove(&batch);
        self.chunks.retain(|_, chunk| chunk.batch != batch);
    }
}

/// In-process asset store with the remote store's batch semantics.
///
/// - chunks can only go into an open batch
/// - commit applies all operations or none
/// - setting content requires the asset to exist, earlier in the same commit
///   or from a previous one
/// - every referenced chunk must belong to the committed batch
/// - a supplied SHA-256 must match the assembled content
#[derive(Debug, Default)]
pub struct InMemoryAssetStore {
    state: Mutex<State>,
}

impl InMemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::transport("in-memory store state poisoned"))
    }

    /// Identity-encoded content committed under `key`.
    pub fn get_asset(&self, key: &ContentKey) -> Option<StoredAsset> {
        let state = self.lock().ok()?;
        let record = state.assets.get(key)?;
        let encoding = record.encodings.get(IDENTITY_ENCODING)?;
        Some(StoredAsset {
            content_type: record.content_type.clone(),
            content: encoding.content.clone(),
            sha256: encoding.sha256,
        })
    }

    pub fn asset_keys(&self) -> Vec<ContentKey> {
        self.lock()
            .map(|state| state.assets.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Batches opened and neither committed nor abandoned.
    pub fn open_batch_count(&self) -> usize {
        self.lock()
            .map(|state| state.open_batches.len())
            .unwrap_or_default()
    }
}

fn apply(
    assets: &mut BTreeMap<ContentKey, AssetRecord>,
    chunks: &HashMap<ChunkId, StoredChunk>,
    batch: BatchId,
    operation: &BatchOperation,
) -> Result<(), StoreError> {
    match operation {
        BatchOperation::CreateAsset { key, content_type } => match assets.get(key) {
            Some(existing) if existing.content_type != *content_type => {
                Err(StoreError::rejected(format!(
                    "asset {key} already exists with content type {}",
                    existing.content_type
                )))
            }
            Some(_) => Ok(()),
            None => {
                assets.insert(
                    key.clone(),
                    AssetRecord {
                        content_type: content_type.clone(),
                        encodings: BTreeMap::new(),
                    },
                );
                Ok(())
            }
        },
        BatchOperation::SetAssetContent {
            key,
            content_encoding,
            chunk_ids,
            sha256,
        } => {
            let record = assets
                .get_mut(key)
                .ok_or_else(|| StoreError::rejected(format!("asset {key} not found")))?;

            let mut content = BytesMut::new();
            for chunk_id in chunk_ids {
                let chunk = chunks
                    .get(chunk_id)
                    .filter(|chunk| chunk.batch == batch)
                    .ok_or_else(|| {
                        StoreError::rejected(format!("chunk {chunk_id} not found in batch {batch}"))
                    })?;
                content.extend_from_slice(&chunk.content);
            }
            let content = content.freeze();

            let actual = Sha256Digest::of(&content);
            if let Some(expected) = sha256 {
                if *expected != actual {
                    return Err(StoreError::rejected(format!(
                        "sha256 mismatch for {key}: expected {expected}, got {actual}"
                    )));
                }
            }

            record.encodings.insert(
                content_encoding.clone(),
                Encoding {
                    content,
                    sha256: actual,
                },
            );
            Ok(())
        }
        BatchOperation::UnsetAssetContent {
            key,
            content_encoding,
        } => {
            let record = assets
                .get_mut(key)
                .ok_or_else(|| StoreError::rejected(format!("asset {key} not found")))?;
            record.encodings.remove(content_encoding);
            Ok(())
        }
        BatchOperation::DeleteAsset { key } => {
            assets.remove(key);
            Ok(())
        }
        BatchOperation::Clear => {
            assets.clear();
            Ok(())
        }
    }
}

#[async_trait]
impl AssetStorePort for InMemoryAssetStore {
    async fn open_batch(&self, _identity: &CallerIdentity) -> Result<BatchId, StoreError> {
        let mut state = self.lock()?;
        let batch = BatchId::new(state.next_id());
        state.open_batches.insert(batch);
        Ok(batch)
    }

    async fn upload_chunk(
        &self,
        _identity: &CallerIdentity,
        batch: BatchId,
        content: Bytes,
    ) -> Result<ChunkId, StoreError> {
        let mut state = self.lock()?;
        if !state.open_batches.contains(&batch) {
            return Err(StoreError::rejected(format!("batch {batch} not found")));
        }
        let chunk_id = ChunkId::new(state.next_id());
        state.chunks.insert(chunk_id, StoredChunk { batch, content });
        Ok(chunk_id)
    }

    async fn commit(
        &self,
        _identity: &CallerIdentity,
        batch: BatchId,
        manifest: OperationManifest,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.open_batches.contains(&batch) {
            return Err(StoreError::rejected(format!("batch {batch} not found")));
        }

        // Stage on a copy so a rejected operation leaves nothing behind.
        let mut staged = state.assets.clone();
        for operation in manifest.operations() {
            apply(&mut staged, &state.chunks, batch, operation)?;
        }

        state.assets = staged;
        state.drop_batch(batch);
        debug!(batch = %batch, operations = manifest.len(), "In-memory batch committed");
        Ok(())
    }

    async fn abandon_batch(
        &self,
        _identity: &CallerIdentity,
        batch: BatchId,
    ) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        if !state.open_batches.contains(&batch) {
            return Err(StoreError::rejected(format!("batch {batch} not found")));
        }
        state.drop_batch(batch);
        Ok(())
    }
}
