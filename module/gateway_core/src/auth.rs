//! API key authentication.
//!
//! Maps a caller-supplied key to the tenant it authenticates as. Production
//! deployments should back this with a secrets store or database rather than
//! a process-environment map; this mirrors the original POC's hardcoded key
//! table, generalized to accept operator-supplied keys too.

use std::collections::HashMap;

use gateway_types::Error;

/// Resolves API keys to tenant identifiers.
pub struct ApiKeyAuthenticator {
    keys: HashMap<String, String>,
}

impl ApiKeyAuthenticator {
    pub fn new(keys: impl IntoIterator<Item = (String, String)>) -> Self {
        Self { keys: keys.into_iter().collect() }
    }

    /// Authenticates `api_key`, returning the tenant it belongs to.
    ///
    /// A missing key is `Unauthorized` (401); a key that doesn't match any
    /// tenant is `Forbidden` (403) -- the same distinction the original POC drew.
    pub fn authenticate(&self, api_key: Option<&str>) -> Result<String, Error> {
        let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
            return Err(Error::Unauthorized("missing API key. Include X-API-Key header.".into()));
        };
        self.keys.get(api_key).cloned().ok_or_else(|| Error::Forbidden("invalid API key".into()))
    }
}
