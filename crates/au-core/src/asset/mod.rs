//! Asset descriptions handed to the uploader.

mod content_key;

pub use content_key::{ContentKey, ContentKeyError};

use bytes::Bytes;

/// Content type recorded when a file does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A file to upload: its name, declared content type and bytes.
///
/// The bytes are reference counted, chunks are zero-copy views into them.
#[derive(Debug, Clone)]
pub struct AssetFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl AssetFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Declared content type, or [`DEFAULT_CONTENT_TYPE`] when absent or blank.
    pub fn effective_content_type(&self) -> &str {
        match self.content_type.as_deref() {
            Some(ct) if !ct.trim().is_empty() => ct,
            _ => DEFAULT_CONTENT_TYPE,
        }
    }
}
