//! Content URL derivation.
//!
//! Pure and deterministic: the same context and key always yield the same
//! URL. Keys are percent-encoded like JavaScript's `encodeURIComponent`, so a
//! key is safe both as a query value and as a single path segment.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::asset::ContentKey;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const KEY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Where the asset store is reachable from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DeploymentContext {
    /// Local development gateway, store addressed by query parameter.
    Local { host: String, store_id: String },
    /// Hosted network, store addressed by subdomain.
    Hosted {
        store_id: String,
        public_domain: String,
    },
}

/// Externally reachable URL of the asset stored under `key`.
///
/// - Local: `http://<host>/?canisterId=<encoded store_id>&asset=<encoded key>`
/// - Hosted: `https://<store_id>.<public_domain>/<encoded key>`
pub fn content_url(context: &DeploymentContext, key: &ContentKey) -> String {
    let encoded = encode_key(key);
    match context {
        DeploymentContext::Local { host, store_id } => {
            let store_id = utf8_percent_encode(store_id, KEY_COMPONENT);
            format!("http://{host}/?canisterId={store_id}&asset={encoded}")
        }
        DeploymentContext::Hosted {
            store_id,
            public_domain,
        } => format!("https://{store_id}.{public_domain}/{encoded}"),
    }
}

/// Percent-encode a key as a single URL component.
pub fn encode_key(key: &ContentKey) -> String {
    utf8_percent_encode(key.as_str(), KEY_COMPONENT).to_string()
}
