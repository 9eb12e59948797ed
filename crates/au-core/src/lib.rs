//! # au-core
//!
//! Core domain models and business rules for the chunked asset uploader.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! chunk splitting, commit manifests, content keys, URL derivation and the
//! upload state machine. Remote calls are expressed as ports (traits) and
//! implemented in `au-infra`.

// Public module exports
pub mod asset;
pub mod checksum;
pub mod chunk;
pub mod config;
pub mod identity;
pub mod ids;
pub mod manifest;
pub mod ports;
pub mod upload;
pub mod url;

// Re-export commonly used types at the crate root
pub use asset::{AssetFile, ContentKey};
pub use checksum::{ChecksumPolicy, Sha256Digest};
pub use chunk::{ChunkSize, Chunks};
pub use config::UploaderConfig;
pub use identity::CallerIdentity;
pub use ids::{BatchId, ChunkId};
pub use manifest::{BatchOperation, OperationManifest};
pub use upload::{UploadEvent, UploadState, UploadStateMachine};
pub use url::DeploymentContext;
