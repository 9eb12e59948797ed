use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, Instrument};

use au_core::config::StoreSettings;
use au_core::manifest::BatchOperation;
use au_core::ports::{AssetStorePort, StoreError};
use au_core::{BatchId, CallerIdentity, ChunkId, OperationManifest};

const PRINCIPAL_HEADER: &str = "x-caller-principal";

#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// Gateway base URL, without trailing slash.
    pub endpoint: String,
    pub store_id: String,
    pub timeout: Duration,
}

impl From<&StoreSettings> for HttpStoreConfig {
    fn from(settings: &StoreSettings) -> Self {
        Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            store_id: settings.store_id.clone(),
            timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

/// Asset store reached through its HTTP gateway.
///
/// Each port call is one `POST <endpoint>/<store_id>/<method>` with a JSON
/// body. Chunk content travels base64-encoded. The caller identity is sent on
/// every request and never kept by the client.
pub struct HttpAssetStore {
    client: Client,
    config: HttpStoreConfig,
}

#[derive(Serialize)]
struct CreateChunkRequest<'a> {
    batch_id: BatchId,
    content: &'a str,
}

#[derive(Serialize)]
struct BatchRequest {
    batch_id: BatchId,
}

#[derive(Serialize)]
struct CommitBatchRequest<'a> {
    batch_id: BatchId,
    operations: &'a [BatchOperation],
}

#[derive(Deserialize)]
struct CreateBatchResponse {
    batch_id: BatchId,
}

#[derive(Deserialize)]
struct CreateChunkResponse {
    chunk_id: ChunkId,
}

impl HttpAssetStore {
    pub fn new(config: HttpStoreConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}/{}", self.config.endpoint, self.config.store_id, method)
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        identity: &CallerIdentity,
        method: &str,
        body: &B,
    ) -> Result<reqwest::Response, StoreError> {
        let mut request = self
            .client
            .post(self.method_url(method))
            .header(PRINCIPAL_HEADER, identity.principal())
            .json(body);
        if let Some(token) = identity.token() {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|err| StoreError::transport(format!("{method}: {err}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(status_error(method, status, detail))
    }

    async fn call_json<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        identity: &CallerIdentity,
        method: &str,
        body: &B,
    ) -> Result<R, StoreError> {
        self.call(identity, method, body)
            .await?
            .json::<R>()
            .await
            .map_err(|err| StoreError::transport(format!("{method}: invalid response: {err}")))
    }
}

/// 4xx: the store refused the call. 5xx and anything else: the call failed.
fn status_error(method: &str, status: StatusCode, detail: String) -> StoreError {
    let msg = if detail.is_empty() {
        format!("{method}: {status}")
    } else {
        format!("{method}: {status}: {detail}")
    };
    if status.is_client_error() {
        StoreError::Rejected(msg)
    } else {
        StoreError::Transport(msg)
    }
}

#[async_trait]
impl AssetStorePort for HttpAssetStore {
    async fn open_batch(&self, identity: &CallerIdentity) -> Result<BatchId, StoreError> {
        let span = debug_span!("infra.store.http.open_batch", store_id = %self.config.store_id);
        async {
            let response: CreateBatchResponse = self
                .call_json(identity, "create_batch", &serde_json::json!({}))
                .await?;
            debug!(batch = %response.batch_id, "Batch opened");
            Ok(response.batch_id)
        }
        .instrument(span)
        .await
    }

    async fn upload_chunk(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        content: Bytes,
    ) -> Result<ChunkId, StoreError> {
        let span = debug_span!(
            "infra.store.http.upload_chunk",
            batch = %batch,
            len = content.len(),
        );
        async {
            let encoded = BASE64.encode(&content);
            let response: CreateChunkResponse = self
                .call_json(
                    identity,
                    "create_chunk",
                    &CreateChunkRequest {
                        batch_id: batch,
                        content: &encoded,
                    },
                )
                .await?;
            Ok(response.chunk_id)
        }
        .instrument(span)
        .await
    }

    async fn commit(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
        manifest: OperationManifest,
    ) -> Result<(), StoreError> {
        let span = debug_span!(
            "infra.store.http.commit",
            batch = %batch,
            operations = manifest.len(),
        );
        async {
            self.call(
                identity,
                "commit_batch",
                &CommitBatchRequest {
                    batch_id: batch,
                    operations: manifest.operations(),
                },
            )
            .await?;
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn abandon_batch(
        &self,
        identity: &CallerIdentity,
        batch: BatchId,
    ) -> Result<(), StoreError> {
        let span = debug_span!("infra.store.http.abandon_batch", batch = %batch);
        async {
            self.call(identity, "delete_batch", &BatchRequest { batch_id: batch })
                .await?;
            Ok(())
        }
        .instrument(span)
        .await
    }
}
