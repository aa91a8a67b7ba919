//! In-memory metadata store for tests and ephemeral use.
//!
//! [`InMemoryMetadataStore`] keeps a [`DeploymentTable`] behind a `RwLock`.
//! The slug check and the insert happen under one write lock, which is what
//! makes `insert_if_absent` a true conditional insert.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagedrop_types::{Category, Deployment, DeploymentId, DeploymentStatus, NewDeployment, Slug};
use tracing::debug;

use crate::error::{MetaError, MetaResult};
use crate::table::DeploymentTable;
use crate::traits::MetadataStore;

/// Source of `created_at` timestamps.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// An in-memory implementation of [`MetadataStore`].
///
/// Data is lost when the store is dropped.
pub struct InMemoryMetadataStore {
    table: RwLock<DeploymentTable>,
    clock: Clock,
}

impl InMemoryMetadataStore {
    /// Create an empty store stamping rows with the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Create an empty store stamping rows with `clock`.
    pub fn with_clock(clock: Clock) -> Self {
        Self::from_table(DeploymentTable::new(), clock)
    }

    pub(crate) fn from_table(table: DeploymentTable, clock: Clock) -> Self {
        Self {
            table: RwLock::new(table),
            clock,
        }
    }

    /// Number of rows in any status.
    pub fn len(&self) -> usize {
        self.table.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().expect("lock poisoned").is_empty()
    }

    pub(crate) fn read_table(&self) -> MetaResult<RwLockReadGuard<'_, DeploymentTable>> {
        self.table
            .read()
            .map_err(|e| MetaError::Unavailable(format!("lock poisoned: {e}")))
    }

    pub(crate) fn write_table(&self) -> MetaResult<RwLockWriteGuard<'_, DeploymentTable>> {
        self.table
            .write()
            .map_err(|e| MetaError::Unavailable(format!("lock poisoned: {e}")))
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryMetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryMetadataStore")
            .field("row_count", &self.len())
            .finish()
    }
}

#[async_trait]
impl MetadataStore for InMemoryMetadataStore {
    async fn insert_if_absent(&self, row: NewDeployment) -> MetaResult<Deployment> {
        let created_at = self.now();
        let inserted = self.write_table()?.insert(row, DeploymentId::new(), created_at)?;
        debug!(id = %inserted.id, slug = %inserted.slug, "deployment row inserted");
        Ok(inserted)
    }

    async fn get_by_slug(&self, slug: &Slug) -> MetaResult<Option<Deployment>> {
        Ok(self.read_table()?.get_by_slug(slug).cloned())
    }

    async fn get_by_id(&self, id: &DeploymentId) -> MetaResult<Option<Deployment>> {
        Ok(self.read_table()?.get_by_id(id).cloned())
    }

    async fn list_where(
        &self,
        status: DeploymentStatus,
        category: Option<Category>,
    ) -> MetaResult<Vec<Deployment>> {
        Ok(self.read_table()?.list_where(status, category))
    }

    async fn update_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> MetaResult<Deployment> {
        let (row, previous) = self.write_table()?.update_status(id, status)?;
        debug!(%id, from = %previous, to = %status, "deployment status updated");
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::tests::new_row;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that advances one second per call, starting at `start`.
    fn stepping_clock(start: i64) -> Clock {
        let t = Arc::new(AtomicI64::new(start));
        Arc::new(move || {
            let secs = t.fetch_add(1, Ordering::SeqCst);
            Utc.timestamp_opt(secs, 0).unwrap()
        })
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let store = InMemoryMetadataStore::with_clock(stepping_clock(100));
        let row = store.insert_if_absent(new_row("abc123", Category::Demo)).await.unwrap();
        assert_eq!(row.created_at, Utc.timestamp_opt(100, 0).unwrap());
        assert_eq!(row.status, DeploymentStatus::Active);
        assert_eq!(store.get_by_id(&row.id).await.unwrap(), Some(row.clone()));
        assert_eq!(store.get_by_slug(&row.slug).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn conditional_insert_rejects_taken_slug() {
        let store = InMemoryMetadataStore::new();
        store.insert_if_absent(new_row("abc123", Category::Demo)).await.unwrap();
        let err = store
            .insert_if_absent(new_row("abc123", Category::Test))
            .await
            .unwrap_err();
        assert!(matches!(err, MetaError::SlugConflict { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn slug_stays_taken_after_unpublish() {
        let store = InMemoryMetadataStore::new();
        let row = store.insert_if_absent(new_row("abc123", Category::Demo)).await.unwrap();
        store.update_status(&row.id, DeploymentStatus::Unpublished).await.unwrap();
        assert!(store.slug_exists(&row.slug).await.unwrap());
        assert!(store.insert_if_absent(new_row("abc123", Category::Demo)).await.is_err());
    }

    #[tokio::test]
    async fn list_excludes_other_statuses() {
        let store = InMemoryMetadataStore::with_clock(stepping_clock(0));
        let a = store.insert_if_absent(new_row("aaaaaa", Category::Demo)).await.unwrap();
        let b = store.insert_if_absent(new_row("bbbbbb", Category::Demo)).await.unwrap();
        store.update_status(&a.id, DeploymentStatus::Unpublished).await.unwrap();

        let active = store.list_where(DeploymentStatus::Active, None).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);

        let gone = store.list_where(DeploymentStatus::Unpublished, None).await.unwrap();
        assert_eq!(gone.len(), 1);
        assert_eq!(gone[0].id, a.id);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let store = InMemoryMetadataStore::new();
        let err = store
            .update_status(&DeploymentId::new(), DeploymentStatus::Unpublished)
            .await
            .unwrap_err();
        assert!(matches!(err, MetaError::NotFound { .. }));
    }

    #[tokio::test]
    async fn concurrent_inserts_on_one_slug_admit_exactly_one() {
        let store = Arc::new(InMemoryMetadataStore::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.insert_if_absent(new_row("race00", Category::Default)).await
                })
            })
            .collect();

        let mut ok = 0;
        let mut conflicts = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => ok += 1,
                Err(MetaError::SlugConflict { .. }) => conflicts += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 15);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn debug_format() {
        let store = InMemoryMetadataStore::new();
        assert!(format!("{store:?}").contains("row_count"));
    }
}
