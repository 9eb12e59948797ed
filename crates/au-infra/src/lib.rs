pub mod config;
pub mod store;
pub mod time;

pub use store::{HttpAssetStore, InMemoryAssetStore};
pub use time::SystemClock;
