use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::identity::CallerIdentity;
use crate::ids::{BatchId, ChunkId};
use crate::manifest::OperationManifest;

use super::errors::StoreError;

/// Remote content store consumed by the uploader.
///
/// Every method is one round trip. The identity is passed per call; adapters
/// must not cache it.
#[async_trait]
pub trait AssetStorePort: Send + Sync {
    /// Open a fresh batch. Each call opens a new one.
    async fn open_batch(&self, identity: &CallerIdentity) -> Result<BatchId, StoreError>;

    /// Upload one chunk into an open, uncommitted batch.
    async fn upload_chunk(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        content: Bytes,
    ) -> Result<ChunkId, StoreError>;

    /// Apply all operations atomically and close the batch.
    ///
    /// Either every operation takes effect or none does.
    async fn commit(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        manifest: OperationManifest,
    ) -> Result<(), StoreError>;

    /// Drop an uncommitted batch and its chunks.
    ///
    /// Stores without this capability let abandoned batches expire on their
    /// own; the default does nothing.
    async fn abandon_batch(
        &self,
        _identity: &CallerIdentity,
        _batch: BatchId,
    ) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl<T: AssetStorePort + ?Sized> AssetStorePort for Arc<T> {
    async fn open_batch(&self, identity: &CallerIdentity) -> Result<BatchId, StoreError> {
        (**self).open_batch(identity).await
    }

    async fn upload_chunk(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        content: Bytes,
    ) -> Result<ChunkId, StoreError> {
        (**self).upload_chunk(identity, batch, content).await
    }

    async fn commit(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        manifest: OperationManifest,
    ) -> Result<(), StoreError> {
        (**self).commit(identity, batch, manifest).await
    }

    async fn abandon_batch(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
    ) -> Result<(), StoreError> {
        (**self).abandon_batch(identity, batch).await
    }
}
