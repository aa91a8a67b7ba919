//! JSON-file backed metadata store.
//!
//! [`FileMetadataStore`] serves reads from an in-memory table and rewrites a
//! single JSON snapshot file after every mutation. The snapshot is written to
//! a temporary sibling and renamed over the old one, so the file on disk is
//! always a complete table.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use pagedrop_types::{Category, Deployment, DeploymentId, DeploymentStatus, NewDeployment, Slug};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{MetaError, MetaResult};
use crate::memory::{Clock, InMemoryMetadataStore};
use crate::table::{DeploymentTable, TableSnapshot};
use crate::traits::MetadataStore;

/// A [`MetadataStore`] persisted to a JSON file.
pub struct FileMetadataStore {
    path: PathBuf,
    inner: InMemoryMetadataStore,
    /// Serializes mutate-then-persist so snapshots land in mutation order.
    persist: Mutex<()>,
}

impl FileMetadataStore {
    /// Open the store at `path`, loading the existing snapshot if present.
    pub async fn open(path: impl Into<PathBuf>) -> MetaResult<Self> {
        Self::open_with_clock(path, Arc::new(Utc::now)).await
    }

    pub async fn open_with_clock(path: impl Into<PathBuf>, clock: Clock) -> MetaResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let table = match fs::read(&path).await {
            Ok(data) => {
                let snapshot: TableSnapshot = serde_json::from_slice(&data)
                    .map_err(|e| MetaError::Serialization(e.to_string()))?;
                DeploymentTable::from_snapshot(snapshot)?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => DeploymentTable::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), rows = table.len(), "metadata store opened");

        Ok(Self {
            path,
            inner: InMemoryMetadataStore::from_table(table, clock),
            persist: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    async fn write_snapshot(&self, data: Vec<u8>) -> MetaResult<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = data.len(), "metadata snapshot written");
        Ok(())
    }

    fn encode(table: &DeploymentTable) -> MetaResult<Vec<u8>> {
        serde_json::to_vec_pretty(&table.snapshot())
            .map_err(|e| MetaError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl MetadataStore for FileMetadataStore {
    async fn insert_if_absent(&self, row: NewDeployment) -> MetaResult<Deployment> {
        let _guard = self.persist.lock().await;
        let created_at = self.inner.now();
        let (inserted, data) = {
            let mut table = self.inner.write_table()?;
            let inserted = table.insert(row, DeploymentId::new(), created_at)?;
            match Self::encode(&table) {
                Ok(data) => (inserted, data),
                Err(e) => {
                    table.remove(&inserted.id);
                    return Err(e);
                }
            }
        };

        if let Err(e) = self.write_snapshot(data).await {
            // A row that is not on disk must not be visible either.
            self.inner.write_table()?.remove(&inserted.id);
            return Err(e);
        }
        debug!(id = %inserted.id, slug = %inserted.slug, "deployment row inserted");
        Ok(inserted)
    }

    async fn get_by_slug(&self, slug: &Slug) -> MetaResult<Option<Deployment>> {
        self.inner.get_by_slug(slug).await
    }

    async fn get_by_id(&self, id: &DeploymentId) -> MetaResult<Option<Deployment>> {
        self.inner.get_by_id(id).await
    }

    async fn list_where(
        &self,
        status: DeploymentStatus,
        category: Option<Category>,
    ) -> MetaResult<Vec<Deployment>> {
        self.inner.list_where(status, category).await
    }

    async fn update_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> MetaResult<Deployment> {
        let _guard = self.persist.lock().await;
        let (row, previous, data) = {
            let mut table = self.inner.write_table()?;
            let (row, previous) = table.update_status(id, status)?;
            if previous == status {
                return Ok(row);
            }
            match Self::encode(&table) {
                Ok(data) => (row, previous, data),
                Err(e) => {
                    table.restore_status(id, previous);
                    return Err(e);
                }
            }
        };

        if let Err(e) = self.write_snapshot(data).await {
            self.inner.write_table()?.restore_status(id, previous);
            return Err(e);
        }
        debug!(%id, from = %previous, to = %status, "deployment status updated");
        Ok(row)
    }
}

impl std::fmt::Debug for FileMetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileMetadataStore")
            .field("path", &self.path)
            .field("row_count", &self.len())
            .finish()
    }
}
