use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Path-like key an asset is visible under once its batch is committed.
///
/// Plain keys are accepted as-is; validation belongs to the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(String);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentKeyError {
    #[error("key segment `{segment}` must not be empty")]
    EmptySegment { segment: &'static str },

    #[error("key segment `{segment}` must not contain '/': {value}")]
    SegmentContainsSlash { segment: &'static str, value: String },
}

impl ContentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build a key namespaced by purpose, owner and upload time:
    /// `/<purpose>/<owner>/<timestamp_ms>/<file_name>`.
    ///
    /// `purpose` and `owner` are single path segments. The file name is kept
    /// verbatim (it is percent-encoded later, when a URL is derived).
    pub fn namespaced(
        purpose: &str,
        owner: &str,
        timestamp_ms: i64,
        file_name: &str,
    ) -> Result<Self, ContentKeyError> {
        check_segment("purpose", purpose)?;
        check_segment("owner", owner)?;
        if file_name.is_empty() {
            return Err(ContentKeyError::EmptySegment {
                segment: "file_name",
            });
        }
        Ok(Self(format!("/{purpose}/{owner}/{timestamp_ms}/{file_name}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

fn check_segment(segment: &'static str, value: &str) -> Result<(), ContentKeyError> {
    if value.is_empty() {
        return Err(ContentKeyError::EmptySegment { segment });
    }
    if value.contains('/') {
        return Err(ContentKeyError::SegmentContainsSlash {
            segment,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl Display for ContentKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContentKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ContentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
