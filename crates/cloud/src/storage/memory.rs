//! Process-local [`ObjectStore`] used by tests and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{ObjectStore, PresignedUrl, StorageError};

const MEMORY_BASE_URL: &str = "http://objects.local";
const MEMORY_PRESIGN_EXPIRY_SECS: u64 = 3600;

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    content_type: String,
}

/// Keeps objects in a map. Presigned URLs point at a fake host and are
/// only meant to be inspected, not fetched.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    puts: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `put_object` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `presign_get` calls fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.lock().get(key).map(|o| o.content_type.clone())
    }

    /// Number of successful `put_object` calls so far.
    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn insert(&self, key: &str, body: Vec<u8>, content_type: &str) {
        self.lock().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        // A poisoned map still holds consistent entries.
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn presign(&self, key: &str, method: &str, headers: BTreeMap<String, String>) -> PresignedUrl {
        PresignedUrl {
            url: format!(
                "{MEMORY_BASE_URL}/{key}?X-Amz-Expires={MEMORY_PRESIGN_EXPIRY_SECS}"
            ),
            method: method.to_string(),
            headers,
            expires_in: MEMORY_PRESIGN_EXPIRY_SECS,
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<PresignedUrl, StorageError> {
        let headers = BTreeMap::from([("content-type".to_string(), content_type.to_string())]);
        Ok(self.presign(key, "PUT", headers))
    }

    async fn presign_get(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Presign {
                key: key.to_string(),
                message: "reads disabled".into(),
            });
        }
        Ok(self.presign(key, "GET", BTreeMap::new()))
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock().get(key).map(|o| o.body.clone()))
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Request {
                key: key.to_string(),
                message: "writes disabled".into(),
            });
        }
        self.insert(key, body, content_type);
        self.puts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}
