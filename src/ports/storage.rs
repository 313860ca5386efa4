/// Storage port trait
///
/// Defines the interface for the key/value blob store that holds the
/// serialized record collection.
/// Implementation: SQLite adapter
use crate::error::Result;

/// Port trait for blob storage
///
/// Calls are synchronous; the record store persists after every change.
pub trait BlobStorePort: Send + Sync {
    /// Read the blob stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
