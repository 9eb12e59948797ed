use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, info_span, Instrument};

use au_core::chunk;
use au_core::ports::ClockPort;
use au_core::url::{content_url, DeploymentContext};
use au_core::{AssetFile, CallerIdentity, ContentKey};

use super::upload_asset::UploadAssetUseCase;

/// Where the uploaded asset should live.
#[derive(Debug, Clone)]
pub enum KeyTarget {
    /// Use this key as-is.
    Explicit(ContentKey),
    /// `/<purpose>/<caller principal>/<now_ms>/<file name>`.
    Namespaced { purpose: String },
}

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedAsset {
    pub key: ContentKey,
    pub url: String,
    pub chunk_count: usize,
    pub size_bytes: usize,
}

/// Upload a file and derive the URL it is reachable under.
pub struct PublishAssetUseCase {
    upload: UploadAssetUseCase,
    clock: Arc<dyn ClockPort>,
    deployment: DeploymentContext,
}

impl PublishAssetUseCase {
    pub fn new(
        upload: UploadAssetUseCase,
        clock: Arc<dyn ClockPort>,
        deployment: DeploymentContext,
    ) -> Self {
        Self {
            upload,
            clock,
            deployment,
        }
    }

    pub async fn execute(
        &self,
        identity: &CallerIdentity,
        file: &AssetFile,
        target: KeyTarget,
    ) -> Result<PublishedAsset> {
        let key = self.resolve_key(identity, file, target)?;
        let span = info_span!("usecase.publish_asset.execute", key = %key);

        async {
            let key = self
                .upload
                .execute(identity, file, key)
                .await
                .with_context(|| format!("failed to upload {}", file.name))?;
            let url = content_url(&self.deployment, &key);
            info!(url = %url, "Asset published");

            Ok(PublishedAsset {
                chunk_count: chunk::chunk_count(file.size_bytes(), self.upload.settings().chunk_size),
                size_bytes: file.size_bytes(),
                key,
                url,
            })
        }
        .instrument(span)
        .await
    }

    fn resolve_key(
        &self,
        identity: &CallerIdentity,
        file: &AssetFile,
        target: KeyTarget,
    ) -> Result<ContentKey> {
        match target {
            KeyTarget::Explicit(key) => Ok(key),
            KeyTarget::Namespaced { purpose } => ContentKey::namespaced(
                &purpose,
                identity.principal(),
                self.clock.now_ms(),
                &file.name,
            )
            .context("failed to build content key"),
        }
    }
}
