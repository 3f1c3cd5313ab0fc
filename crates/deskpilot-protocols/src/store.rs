//! Durable key-value port.

use async_trait::async_trait;

use crate::error::StoreError;

/// Small string key-value store that survives restarts.
///
/// Holds the active provider preference and encrypted credentials.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}
