//! Asset store adapters.
//!
//! - [`HttpAssetStore`]: JSON-over-HTTP binding of a remote store gateway.
//! - [`InMemoryAssetStore`]: in-process store with the same commit semantics,
//!   for dry runs and tests.

mod http;
mod memory;

pub use http::{HttpAssetStore, HttpStoreConfig};
pub use memory::{InMemoryAssetStore, StoredAsset};
