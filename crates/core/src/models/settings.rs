use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// User-configurable settings, persisted next to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How long a fetched quote is reused before refetching.
    pub quote_ttl_seconds: u64,

    /// Timeout for HTTP quote providers.
    pub request_timeout_seconds: u64,

    /// Optional API keys for providers that require them.
    /// Keys: provider name (e.g., "finnhub").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quote_ttl_seconds: 60,
            request_timeout_seconds: 30,
            api_keys: HashMap::new(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn quote_ttl(&self) -> chrono::Duration {
        i64::try_from(self.quote_ttl_seconds)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}
