//! Blob storage service contract
//!
//! Used only by photo attachment: upload the bytes, then persist the
//! stable public URL into the verification record.

use crate::error::StorageError;
use async_trait::async_trait;

/// Async blob storage collaborator
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store `bytes` under `path`, returning the stored path
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, StorageError>;

    /// Stable public URL for a stored path
    fn public_url(&self, stored_path: &str) -> String;
}
