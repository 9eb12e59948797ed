use std::fmt::{Debug, Formatter};

/// Credential authorizing calls against the asset store.
///
/// Supplied by the caller for every remote call; the uploader never stores it.
/// Read-only, so one identity can back any number of concurrent uploads.
#[derive(Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    principal: String,
    token: Option<String>,
}

impl CallerIdentity {
    pub fn new(principal: impl Into<String>, token: Option<String>) -> Self {
        Self {
            principal: principal.into(),
            token,
        }
    }

    pub fn anonymous() -> Self {
        Self::new("2vxsx-fae", None)
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

// Keep bearer tokens out of logs.
impl Debug for CallerIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallerIdentity")
            .field("principal", &self.principal)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
