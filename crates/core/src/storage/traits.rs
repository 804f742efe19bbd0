use async_trait::async_trait;

use crate::errors::CoreError;

/// Minimal asynchronous string key-value store (device storage).
///
/// Values are opaque strings; callers store JSON blobs.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A key that was never written yields `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Write (or overwrite) a value.
    async fn set(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Delete a value. Deleting a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), CoreError>;
}

/// Keys must be non-empty and limited to `[A-Za-z0-9_-]`, so every backend
/// can map them to file names or table keys unchanged.
pub fn validate_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty()
        || !key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(CoreError::Storage(format!("Invalid storage key '{key}'")));
    }
    Ok(())
}
