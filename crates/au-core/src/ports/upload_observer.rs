use crate::asset::ContentKey;
use crate::upload::UploadState;

/// Receives every state transition of an upload, e.g. to drive a progress bar.
///
/// Called inline from the upload task; implementations must not block.
pub trait UploadObserverPort: Send + Sync {
    fn on_state_changed(&self, key: &ContentKey, state: &UploadState);
}

/// Observer that ignores all transitions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUploadObserver;

impl UploadObserverPort for NoopUploadObserver {
    fn on_state_changed(&self, _key: &ContentKey, _state: &UploadState) {}
}
