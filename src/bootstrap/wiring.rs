//! Dependency wiring
//!
//! Builds the use cases from a loaded [`UploaderConfig`]: picks the store
//! adapter, attaches the logging observer, and binds the deployment context.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use au_app::usecases::{PublishAssetUseCase, UploadAssetUseCase};
use au_core::ports::{AssetStorePort, UploadObserverPort};
use au_core::upload::UploadState;
use au_core::{ContentKey, UploaderConfig};
use au_infra::store::HttpStoreConfig;
use au_infra::{HttpAssetStore, InMemoryAssetStore, SystemClock};

/// Which store adapter the use cases talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// The configured HTTP gateway.
    Http,
    /// A throwaway in-process store; nothing leaves the machine.
    InMemory,
}

/// Logs each upload state transition.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingUploadObserver;

impl UploadObserverPort for LoggingUploadObserver {
    fn on_state_changed(&self, key: &ContentKey, state: &UploadState) {
        match state {
            UploadState::Idle => {}
            UploadState::BatchOpen {
                batch,
                total_chunks,
            } => info!(key = %key, batch = %batch, total_chunks, "Batch opened"),
            UploadState::ChunksUploading {
                completed,
                total_chunks,
                ..
            } => info!(key = %key, completed, total_chunks, "Chunk uploaded"),
            UploadState::Committing { batch } => {
                info!(key = %key, batch = %batch, "Committing batch")
            }
            UploadState::Done => info!(key = %key, "Upload done"),
            UploadState::Failed { reason } => warn!(key = %key, reason = %reason, "Upload failed"),
        }
    }
}

pub fn build_store(
    config: &UploaderConfig,
    backend: StoreBackend,
) -> anyhow::Result<Arc<dyn AssetStorePort>> {
    match backend {
        StoreBackend::Http => {
            let store = HttpAssetStore::new(HttpStoreConfig::from(&config.store))
                .context("Failed to create HTTP asset store")?;
            Ok(Arc::new(store))
        }
        StoreBackend::InMemory => Ok(Arc::new(InMemoryAssetStore::new())),
    }
}

pub fn build_publish_usecase(
    config: &UploaderConfig,
    backend: StoreBackend,
) -> anyhow::Result<PublishAssetUseCase> {
    let store = build_store(config, backend)?;
    let upload = UploadAssetUseCase::new(store, config.upload.clone())
        .with_observer(Arc::new(LoggingUploadObserver));
    Ok(PublishAssetUseCase::new(
        upload,
        Arc::new(SystemClock),
        config.deployment_context(),
    ))
}
