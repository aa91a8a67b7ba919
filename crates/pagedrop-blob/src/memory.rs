use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{BlobError, BlobResult};
use crate::path::validate_blob_path;
use crate::traits::{join_url, BlobStore};

/// Base URL used when none is configured.
const DEFAULT_BASE_URL: &str = "memory://pagedrop";

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Blobs are held behind a `RwLock`;
/// `Bytes` makes reads a reference-count bump rather than a copy.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
    base_url: String,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a store whose public URLs are rooted at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            base_url: base_url.into(),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .expect("lock poisoned")
            .values()
            .map(|b| b.len() as u64)
            .sum()
    }

    /// Sorted list of every stored path.
    pub fn paths(&self) -> Vec<String> {
        let map = self.blobs.read().expect("lock poisoned");
        let mut paths: Vec<String> = map.keys().cloned().collect();
        paths.sort();
        paths
    }

    fn read_map(&self) -> BlobResult<RwLockReadGuard<'_, HashMap<String, Bytes>>> {
        self.blobs
            .read()
            .map_err(|e| BlobError::Unavailable(format!("lock poisoned: {e}")))
    }

    fn write_map(&self) -> BlobResult<RwLockWriteGuard<'_, HashMap<String, Bytes>>> {
        self.blobs
            .write()
            .map_err(|e| BlobError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, data: Bytes) -> BlobResult<()> {
        validate_blob_path(path)?;
        let mut map = self.write_map()?;
        if map.contains_key(path) {
            return Err(BlobError::AlreadyExists(path.to_string()));
        }
        map.insert(path.to_string(), data);
        Ok(())
    }

    async fn get(&self, path: &str) -> BlobResult<Option<Bytes>> {
        validate_blob_path(path)?;
        Ok(self.read_map()?.get(path).cloned())
    }

    async fn delete(&self, path: &str) -> BlobResult<bool> {
        validate_blob_path(path)?;
        Ok(self.write_map()?.remove(path).is_some())
    }

    async fn exists(&self, path: &str) -> BlobResult<bool> {
        validate_blob_path(path)?;
        Ok(self.read_map()?.contains_key(path))
    }

    fn public_url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("base_url", &self.base_url)
            .finish()
    }
}
