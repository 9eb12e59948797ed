use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, debug_span, info, info_span, warn, Instrument};

use au_core::chunk::{self, ChunkSize};
use au_core::config::UploadSettings;
use au_core::ports::{AssetStorePort, NoopUploadObserver, StoreError, UploadObserverPort};
use au_core::upload::{UploadEvent, UploadStateMachine};
use au_core::{AssetFile, BatchId, CallerIdentity, ChunkId, ContentKey, OperationManifest};

/// Drives one file through the asset store protocol:
/// open a batch, upload every chunk, commit `create-asset` + `set-asset-content`.
///
/// Holds no per-upload state, so one instance serves concurrent uploads of
/// different files (each gets its own batch).
pub struct UploadAssetUseCase {
    store: Arc<dyn AssetStorePort>,
    observer: Arc<dyn UploadObserverPort>,
    settings: UploadSettings,
}

impl UploadAssetUseCase {
    pub fn new(store: Arc<dyn AssetStorePort>, settings: UploadSettings) -> Self {
        Self {
            store,
            observer: Arc::new(NoopUploadObserver),
            settings,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn UploadObserverPort>) -> Self {
        self.observer = observer;
        self
    }

    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    /// Upload `file` and make it visible under `key`.
    ///
    /// Returns `key` unchanged on success. Any store failure aborts the upload
    /// and is returned as-is; nothing is retried and no commit is issued after
    /// a failed chunk.
    pub async fn execute(
        &self,
        identity: &CallerIdentity,
        file: &AssetFile,
        key: ContentKey,
    ) -> Result<ContentKey, StoreError> {
        let span = info_span!(
            "usecase.upload_asset.execute",
            key = %key,
            file_name = %file.name,
            size_bytes = file.size_bytes(),
            chunk_size = self.settings.chunk_size.get(),
        );

        self.execute_inner(identity, file, key).instrument(span).await
    }

    async fn execute_inner(
        &self,
        identity: &CallerIdentity,
        file: &AssetFile,
        key: ContentKey,
    ) -> Result<ContentKey, StoreError> {
        let mut progress = Progress::new(&key, self.observer.as_ref());
        let chunk_size = self.settings.chunk_size;
        let total_chunks = chunk::chunk_count(file.size_bytes(), chunk_size);

        let batch = match self.store.open_batch(identity).await {
            Ok(batch) => batch,
            Err(err) => {
                warn!(error = %err, "Failed to open upload batch");
                progress.fail(&err);
                return Err(err);
            }
        };
        debug!(batch = %batch, total_chunks, "Opened upload batch");
        progress.advance(UploadEvent::BatchOpened {
            batch,
            total_chunks,
        });

        let chunk_ids = match self
            .upload_chunks(identity, batch, file, chunk_size, &mut progress)
            .await
        {
            Ok(ids) => ids,
            Err(err) => {
                warn!(batch = %batch, error = %err, "Chunk upload failed; aborting before commit");
                progress.fail(&err);
                self.release_batch(identity, batch).await;
                return Err(err);
            }
        };

        let sha256 = self.settings.checksum.digest(&file.bytes);
        let manifest = OperationManifest::for_upload(
            &key,
            file.effective_content_type(),
            chunk_ids,
            sha256,
        );

        progress.advance(UploadEvent::CommitStarted);
        if let Err(err) = self
            .store
            .commit(identity, batch, manifest)
            .instrument(debug_span!("usecase.upload_asset.commit", batch = %batch))
            .await
        {
            warn!(batch = %batch, error = %err, "Commit rejected");
            progress.fail(&err);
            self.release_batch(identity, batch).await;
            return Err(err);
        }
        progress.advance(UploadEvent::Committed);

        info!(batch = %batch, total_chunks, "Asset upload committed");
        Ok(key)
    }

    /// Upload all chunks and return their ids in file order.
    async fn upload_chunks(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        file: &AssetFile,
        chunk_size: ChunkSize,
        progress: &mut Progress<'_>,
    ) -> Result<Vec<ChunkId>, StoreError> {
        let limit = self.settings.max_concurrent_chunks.get();
        if limit == 1 {
            return self
                .upload_chunks_sequential(identity, batch, file, chunk_size, progress)
                .await;
        }
        self.upload_chunks_concurrent(identity, batch, file, chunk_size, limit, progress)
            .await
    }

    async fn upload_chunks_sequential(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        file: &AssetFile,
        chunk_size: ChunkSize,
        progress: &mut Progress<'_>,
    ) -> Result<Vec<ChunkId>, StoreError> {
        let chunks = chunk::split(&file.bytes, chunk_size);
        let mut chunk_ids = Vec::with_capacity(chunks.len());

        for (index, slice) in chunks.enumerate() {
            let content = file.bytes.slice_ref(slice);
            let chunk_id = self
                .store
                .upload_chunk(identity, batch, content)
                .instrument(debug_span!(
                    "usecase.upload_asset.upload_chunk",
                    index,
                    len = slice.len(),
                ))
                .await?;
            chunk_ids.push(chunk_id);
            progress.advance(UploadEvent::ChunkUploaded);
        }

        Ok(chunk_ids)
    }

    /// Up to `limit` uploads in flight. Each result lands in the slot of its
    /// chunk index, so completion order does not leak into the manifest.
    async fn upload_chunks_concurrent(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        file: &AssetFile,
        chunk_size: ChunkSize,
        limit: usize,
        progress: &mut Progress<'_>,
    ) -> Result<Vec<ChunkId>, StoreError> {
        // Owned parts only: a closure over borrowed slices makes the future non-`Send`.
        let parts: Vec<(usize, Bytes)> = chunk::split(&file.bytes, chunk_size)
            .enumerate()
            .map(|(index, slice)| (index, file.bytes.slice_ref(slice)))
            .collect();
        let mut slots: Vec<Option<ChunkId>> = vec![None; parts.len()];

        let mut in_flight = stream::iter(parts.into_iter().map(|(index, content)| {
            let store = Arc::clone(&self.store);
            let identity = identity.clone();
            let len = content.len();
            async move {
                let chunk_id = store
                    .upload_chunk(&identity, batch, content)
                    .instrument(debug_span!("usecase.upload_asset.upload_chunk", index, len))
                    .await?;
                Ok::<_, StoreError>((index, chunk_id))
            }
        }))
        .buffer_unordered(limit);

        // Returning early drops the stream, which cancels the uploads still in flight.
        while let Some((index, chunk_id)) = in_flight.try_next().await? {
            slots[index] = Some(chunk_id);
            progress.advance(UploadEvent::ChunkUploaded);
        }

        slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| StoreError::transport("chunk upload stream ended with missing results"))
    }

    /// Compensating action for an upload that failed after its batch opened.
    async fn release_batch(&self, identity: &CallerIdentity, batch: BatchId) {
        if !self.settings.cleanup_on_failure {
            debug!(batch = %batch, "Leaving failed batch to the store's own expiry");
            return;
        }
        match self.store.abandon_batch(identity, batch).await {
            Ok(()) => info!(batch = %batch, "Abandoned failed upload batch"),
            Err(err) => warn!(
                batch = %batch,
                error = %err,
                "Best-effort batch cleanup failed; batch stays orphaned",
            ),
        }
    }
}

/// State machine of one upload plus its observer.
struct Progress<'a> {
    key: &'a ContentKey,
    observer: &'a dyn UploadObserverPort,
    machine: UploadStateMachine,
}

impl<'a> Progress<'a> {
    fn new(key: &'a ContentKey, observer: &'a dyn UploadObserverPort) -> Self {
        Self {
            key,
            observer,
            machine: UploadStateMachine::new(),
        }
    }

    fn advance(&mut self, event: UploadEvent) {
        match self.machine.handle_event(event) {
            Ok(state) => self.observer.on_state_changed(self.key, state),
            Err(err) => warn!(error = %err, "Ignoring out-of-order upload event"),
        }
    }

    fn fail(&mut self, err: &StoreError) {
        self.advance(UploadEvent::Failed {
            reason: err.to_string(),
        });
    }
}
