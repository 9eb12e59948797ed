//! Asset Uploader Application Orchestration Layer
//!
//! This crate contains the upload use cases. They depend on `au-core` ports
//! only; adapters are injected by the caller.

pub mod usecases;

pub use usecases::{PublishAssetUseCase, PublishedAsset, UploadAssetUseCase};
