use async_trait::async_trait;
use bytes::Bytes;

use crate::error::BlobResult;

/// Path-addressed byte storage.
///
/// All implementations must satisfy these invariants:
/// - `put` fails with [`BlobError::AlreadyExists`](crate::BlobError::AlreadyExists)
///   rather than replacing existing bytes.
/// - A successful `put` is visible to every subsequent `get` on any handle.
/// - `delete` of a missing path is not an error.
/// - Implementations are safe to share across tasks; callers never assume
///   exclusive access.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` at `path`.
    async fn put(&self, path: &str, data: Bytes) -> BlobResult<()>;

    /// Read the blob at `path`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    async fn get(&self, path: &str) -> BlobResult<Option<Bytes>>;

    /// Remove the blob at `path`. Returns `true` if it existed.
    async fn delete(&self, path: &str) -> BlobResult<bool>;

    /// Check whether a blob is stored at `path`.
    async fn exists(&self, path: &str) -> BlobResult<bool> {
        Ok(self.get(path).await?.is_some())
    }

    /// Public locator for the blob at `path`. Pure; performs no I/O.
    fn public_url_for(&self, path: &str) -> String;
}

/// Join a base URL and a blob path with exactly one separating slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
