use std::sync::Arc;

use bytes::Bytes;
use pagedrop_blob::BlobStore;
use pagedrop_meta::{MetaError, MetadataStore};
use pagedrop_types::{
    CategoryFilter, Deployment, DeploymentId, DeploymentStatus, NewDeployment, Slug,
};
use tracing::{debug, info, warn};

use crate::allocator::{AllocatorConfig, SlugAllocator};
use crate::error::{PublishError, PublishResult};
use crate::request::{PublishReceipt, PublishRequest};

/// Publish, fetch, list, and unpublish documents across a blob store and a
/// metadata store.
///
/// The service holds no mutable state of its own; clones share the same
/// stores and every call is independent.
#[derive(Clone)]
pub struct PublishService {
    blobs: Arc<dyn BlobStore>,
    meta: Arc<dyn MetadataStore>,
    allocator: SlugAllocator,
}

impl PublishService {
    /// Service with a default random slug allocator.
    pub fn new(blobs: Arc<dyn BlobStore>, meta: Arc<dyn MetadataStore>) -> Self {
        Self::with_config(blobs, meta, AllocatorConfig::default())
    }

    pub fn with_config(
        blobs: Arc<dyn BlobStore>,
        meta: Arc<dyn MetadataStore>,
        config: AllocatorConfig,
    ) -> Self {
        let allocator = SlugAllocator::new(Arc::clone(&meta), config);
        Self::with_allocator(blobs, meta, allocator)
    }

    pub fn with_allocator(
        blobs: Arc<dyn BlobStore>,
        meta: Arc<dyn MetadataStore>,
        allocator: SlugAllocator,
    ) -> Self {
        Self {
            blobs,
            meta,
            allocator,
        }
    }

    // ---- Write path ----

    /// Store a document under a fresh slug and record it.
    ///
    /// The blob write always precedes the row insert. If the insert fails,
    /// the blob is deleted again; a failure of that delete is logged and does
    /// not change the returned error.
    pub async fn publish(&self, request: PublishRequest) -> PublishResult<PublishReceipt> {
        let (body, file_name, category, notes) = request.into_parts();

        let slug = self.allocator.allocate().await?;
        let file_path = slug.file_path();
        let size = body.len();

        self.blobs
            .put(&file_path, body)
            .await
            .map_err(|source| PublishError::StorageWriteFailed {
                path: file_path.clone(),
                source,
            })?;
        debug!(%slug, path = %file_path, size, "document stored");

        let public_url = self.blobs.public_url_for(&file_path);
        let row = NewDeployment {
            slug: slug.clone(),
            file_name,
            file_path: file_path.clone(),
            public_url: public_url.clone(),
            category,
            status: DeploymentStatus::Active,
            notes,
        };

        let deployment = match self.meta.insert_if_absent(row).await {
            Ok(deployment) => deployment,
            Err(source) => {
                self.discard_blob(&slug, &file_path).await;
                return Err(PublishError::MetadataWriteFailed { slug, source });
            }
        };

        info!(
            id = %deployment.id,
            slug = %deployment.slug,
            category = %deployment.category,
            size,
            "document published"
        );
        Ok(PublishReceipt {
            id: deployment.id,
            slug,
            public_url,
        })
    }

    /// Compensating delete for a blob whose row was never recorded.
    async fn discard_blob(&self, slug: &Slug, file_path: &str) {
        match self.blobs.delete(file_path).await {
            Ok(true) => debug!(%slug, path = file_path, "orphaned document removed"),
            Ok(false) => warn!(%slug, path = file_path, "orphaned document already gone"),
            Err(e) => warn!(
                %slug,
                path = file_path,
                error = %e,
                "failed to remove orphaned document"
            ),
        }
    }

    /// Revoke visibility of a deployment.
    ///
    /// Unpublishing an already-unpublished deployment succeeds. The stored
    /// bytes are kept.
    pub async fn unpublish(&self, id: &DeploymentId) -> PublishResult<()> {
        match self
            .meta
            .update_status(id, DeploymentStatus::Unpublished)
            .await
        {
            Ok(row) => {
                info!(%id, slug = %row.slug, "deployment unpublished");
                Ok(())
            }
            Err(MetaError::NotFound { .. }) => Err(PublishError::NotFound(id.to_string())),
            Err(e) => Err(PublishError::MetadataUnavailable(e)),
        }
    }

    // ---- Read path ----

    /// Bytes of a visible deployment.
    ///
    /// A string that is not a well-formed slug cannot name a deployment and
    /// is reported as `NotFound`.
    pub async fn fetch_for_view(&self, slug: &str) -> PublishResult<Bytes> {
        let deployment = self.get(slug).await?;
        if !deployment.is_active() {
            debug!(slug = %deployment.slug, "fetch of unpublished deployment refused");
            return Err(PublishError::Unpublished {
                slug: deployment.slug,
            });
        }

        match self.blobs.get(&deployment.file_path).await {
            Ok(Some(bytes)) => Ok(bytes),
            Ok(None) => Err(PublishError::StorageReadFailed {
                path: deployment.file_path,
                reason: "document missing from blob store".into(),
            }),
            Err(e) => Err(PublishError::StorageReadFailed {
                path: deployment.file_path,
                reason: e.to_string(),
            }),
        }
    }

    /// The row for `slug`, in any status.
    pub async fn get(&self, slug: &str) -> PublishResult<Deployment> {
        let slug = Slug::parse(slug).map_err(|_| PublishError::NotFound(slug.to_string()))?;
        self.meta
            .get_by_slug(&slug)
            .await
            .map_err(PublishError::MetadataUnavailable)?
            .ok_or_else(|| PublishError::NotFound(slug.to_string()))
    }

    /// Active deployments matching `filter`, newest first.
    pub async fn list(&self, filter: CategoryFilter) -> PublishResult<Vec<Deployment>> {
        self.meta
            .list_where(DeploymentStatus::Active, filter.category())
            .await
            .map_err(PublishError::MetadataUnavailable)
    }

    // ---- Accessors ----

    pub fn allocator(&self) -> &SlugAllocator {
        &self.allocator
    }

    pub fn blob_store(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    pub fn metadata_store(&self) -> &Arc<dyn MetadataStore> {
        &self.meta
    }
}

impl std::fmt::Debug for PublishService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishService")
            .field("allocator", &self.allocator)
            .finish()
    }
}
