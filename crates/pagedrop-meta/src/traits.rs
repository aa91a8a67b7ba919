//! The [`MetadataStore`] trait defining the deployment table interface.
//!
//! Any backend (in-memory, file, database) implements this trait to hold
//! deployment rows for the publish service.

use async_trait::async_trait;
use pagedrop_types::{Category, Deployment, DeploymentId, DeploymentStatus, NewDeployment, Slug};

use crate::error::MetaResult;

/// Storage backend for deployment rows.
///
/// Implementations must be thread-safe (`Send + Sync`) and treat the slug
/// column as unique: two inserts racing on the same slug must result in
/// exactly one row and one [`MetaError::SlugConflict`](crate::MetaError::SlugConflict).
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a row unless its slug is taken.
    ///
    /// Assigns the row's `id` and `created_at` and returns the stored row.
    async fn insert_if_absent(&self, row: NewDeployment) -> MetaResult<Deployment>;

    /// Look up a row by slug. Returns `Ok(None)` if no row has it.
    async fn get_by_slug(&self, slug: &Slug) -> MetaResult<Option<Deployment>>;

    /// Look up a row by id. Returns `Ok(None)` if no row has it.
    async fn get_by_id(&self, id: &DeploymentId) -> MetaResult<Option<Deployment>>;

    /// Rows with the given status, optionally restricted to one category,
    /// ordered by `created_at` descending.
    async fn list_where(
        &self,
        status: DeploymentStatus,
        category: Option<Category>,
    ) -> MetaResult<Vec<Deployment>>;

    /// Set the status of the row with `id` and return the updated row.
    ///
    /// Fails with `NotFound` if no row has the id. Setting a row to the
    /// status it already has succeeds without change.
    async fn update_status(
        &self,
        id: &DeploymentId,
        status: DeploymentStatus,
    ) -> MetaResult<Deployment>;

    /// Whether any row, in any status, has this slug.
    async fn slug_exists(&self, slug: &Slug) -> MetaResult<bool> {
        Ok(self.get_by_slug(slug).await?.is_some())
    }
}
