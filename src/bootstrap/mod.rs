pub mod tracing;
pub mod wiring;

pub use tracing::init_tracing_subscriber;
pub use wiring::{build_publish_usecase, build_store, LoggingUploadObserver, StoreBackend};
