//! Object store abstraction.
//!
//! Handlers depend on [`ObjectStore`] so the S3 backend can be swapped for
//! [`InMemoryObjectStore`] in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

pub mod memory;
pub mod s3;

pub use memory::InMemoryObjectStore;
pub use s3::{S3ObjectStore, StorageConfig};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Missing or invalid configuration.
    #[error("Storage configuration error: {0}")]
    Config(String),

    /// A presigned request could not be produced.
    #[error("Failed to presign '{key}': {message}")]
    Presign { key: String, message: String },

    /// The store rejected or failed a request.
    #[error("Storage request for '{key}' failed: {message}")]
    Request { key: String, message: String },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A time-limited URL the browser uses to talk to the bucket directly.
#[derive(Debug, Clone, Serialize)]
pub struct PresignedUrl {
    pub url: String,
    pub method: String,
    /// Headers the client must send verbatim (they are part of the signature).
    pub headers: BTreeMap<String, String>,
    pub expires_in: u64,
}

#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Presign a PUT of `key` with the given `Content-Type`.
    async fn presign_put(&self, key: &str, content_type: &str)
        -> Result<PresignedUrl, StorageError>;

    async fn presign_get(&self, key: &str) -> Result<PresignedUrl, StorageError>;

    /// Fetch an object. A missing key is `Ok(None)`, not an error.
    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Delete an object. Deleting a missing key succeeds.
    async fn delete_object(&self, key: &str) -> Result<(), StorageError>;
}
