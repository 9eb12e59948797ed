//! # Configuration DTOs
//!
//! Plain data mapped from the TOML config file. Loading lives in `au-infra`;
//! this module only defines the shape and the v1 defaults.
//!
//! ```toml
//! [upload]
//! chunk_size_bytes = 1048576
//! max_concurrent_chunks = 1
//! checksum = "none"
//! cleanup_on_failure = false
//!
//! [store]
//! store_id = "bkyz2-fmaaa-aaaaa-qaaaq-cai"
//! endpoint = "http://127.0.0.1:4943/api/asset-store"
//! request_timeout_secs = 30
//!
//! [deployment]
//! mode = "local"
//! local_host = "127.0.0.1:4943"
//! public_domain = "icp0.io"
//! ```

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumPolicy;
use crate::chunk::ChunkSize;
use crate::url::DeploymentContext;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploaderConfig {
    pub upload: UploadSettings,
    pub store: StoreSettings,
    pub deployment: DeploymentSettings,
}

impl UploaderConfig {
    /// Deployment context for URL derivation, bound to the configured store.
    pub fn deployment_context(&self) -> DeploymentContext {
        self.deployment.context_for(&self.store.store_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    #[serde(rename = "chunk_size_bytes")]
    pub chunk_size: ChunkSize,
    /// Chunk uploads in flight at once. `1` uploads strictly one after another.
    pub max_concurrent_chunks: NonZeroUsize,
    pub checksum: ChecksumPolicy,
    /// Abandon the batch on the remote side when an upload fails.
    pub cleanup_on_failure: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            chunk_size: ChunkSize::default(),
            max_concurrent_chunks: NonZeroUsize::MIN,
            checksum: ChecksumPolicy::None,
            cleanup_on_failure: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub store_id: String,
    /// Base URL of the store's RPC gateway.
    pub endpoint: String,
    pub request_timeout_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_id: String::new(),
            endpoint: "http://127.0.0.1:4943/api/asset-store".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentMode {
    #[default]
    Local,
    Hosted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentSettings {
    pub mode: DeploymentMode,
    pub local_host: String,
    pub public_domain: String,
}

impl Default for DeploymentSettings {
    fn default() -> Self {
        Self {
            mode: DeploymentMode::Local,
            local_host: "127.0.0.1:4943".to_string(),
            public_domain: "icp0.io".to_string(),
        }
    }
}

impl DeploymentSettings {
    pub fn context_for(&self, store_id: &str) -> DeploymentContext {
        match self.mode {
            DeploymentMode::Local => DeploymentContext::Local {
                host: self.local_host.clone(),
                store_id: store_id.to_string(),
            },
            DeploymentMode::Hosted => DeploymentContext::Hosted {
                store_id: store_id.to_string(),
                public_domain: self.public_domain.clone(),
            },
        }
    }
}
