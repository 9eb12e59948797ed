//! Port interfaces for the application layer
//!
//! Ports define the contract between the upload use cases and the
//! infrastructure that talks to the outside world (the remote asset store,
//! the system clock, progress reporting). Use cases depend on these traits
//! only; `au-infra` provides the implementations.

mod asset_store;
mod clock;
pub mod errors;
mod upload_observer;

#[cfg(any(test, feature = "mocks"))]
pub mod tests;

pub use asset_store::AssetStorePort;
pub use clock::ClockPort;
pub use errors::StoreError;
pub use upload_observer::{NoopUploadObserver, UploadObserverPort};
