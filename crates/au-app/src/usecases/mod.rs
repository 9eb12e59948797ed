//! Upload use cases
//!
//! ```text
//! caller
//!   ↓
//! PublishAssetUseCase      → derive key, upload, derive URL
//!   ↓
//! UploadAssetUseCase       → open batch → chunks × N → commit
//!   ↓
//! AssetStorePort (au-infra)
//! ```

pub mod publish_asset;
pub mod upload_asset;

pub use publish_asset::{KeyTarget, PublishAssetUseCase, PublishedAsset};
pub use upload_asset::UploadAssetUseCase;
