use thiserror::Error;

/// Failure of a remote asset store call.
///
/// The uploader does not recover from either kind; both are returned to the
/// caller as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The call did not complete (connection, timeout, undecodable reply).
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered and refused the call (unknown batch, bad manifest, ...).
    #[error("rejected by asset store: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn transport(msg: impl Into<String>) -> Self {
        StoreError::Transport(msg.into())
    }

    pub fn rejected(msg: impl Into<String>) -> Self {
        StoreError::Rejected(msg.into())
    }
}
