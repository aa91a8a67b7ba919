use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::path::validate_blob_path;
use crate::traits::{join_url, BlobStore};

/// Blob store keeping one file per path under a root directory.
///
/// Writes land in a temporary sibling file first and are then hard-linked
/// into place, so a reader never observes a partially written blob and an
/// occupied path is never replaced.
pub struct FsBlobStore {
    root: PathBuf,
    base_url: String,
    tmp_counter: AtomicU64,
}

impl FsBlobStore {
    /// Open (or create) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>, base_url: impl Into<String>) -> BlobResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        debug!(root = %root.display(), "blob store opened");
        Ok(Self {
            root,
            base_url: base_url.into(),
            tmp_counter: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> BlobResult<PathBuf> {
        validate_blob_path(path)?;
        Ok(self.root.join(path))
    }

    fn tmp_path_for(&self, target: &Path) -> PathBuf {
        let n = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!(".{name}.{}.{n}.tmp", std::process::id()))
    }
}

async fn discard_temp(tmp: &Path) {
    match fs::remove_file(tmp).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => debug!(tmp = %tmp.display(), error = %e, "failed to remove temporary blob"),
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, path: &str, data: Bytes) -> BlobResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let tmp = self.tmp_path_for(&target);
        if let Err(e) = fs::write(&tmp, &data).await {
            discard_temp(&tmp).await;
            return Err(e.into());
        }
        let linked = fs::hard_link(&tmp, &target).await;
        // The temporary name is garbage whether or not the link succeeded.
        discard_temp(&tmp).await;

        match linked {
            Ok(()) => {
                debug!(path, len = data.len(), "blob stored");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(BlobError::AlreadyExists(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, path: &str) -> BlobResult<Option<Bytes>> {
        let target = self.resolve(path)?;
        match fs::read(&target).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, path: &str) -> BlobResult<bool> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => {
                // Drop the per-slug directory if this was its last file.
                if let Some(parent) = target.parent() {
                    if parent != self.root {
                        let _ = fs::remove_dir(parent).await;
                    }
                }
                debug!(path, "blob deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> BlobResult<bool> {
        let target = self.resolve(path)?;
        Ok(fs::try_exists(&target).await?)
    }

    fn public_url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

impl std::fmt::Debug for FsBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsBlobStore")
            .field("root", &self.root)
            .field("base_url", &self.base_url)
            .finish()
    }
}
