use std::sync::Arc;

use pagedrop_blob::{BlobStore, FsBlobStore, InMemoryBlobStore};
use pagedrop_meta::{FileMetadataStore, InMemoryMetadataStore, MetadataStore};
use pagedrop_publish::PublishService;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{ServerConfig, StorageBackend};
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// Open the stores `config` names and wire them into a service.
pub async fn open_service(config: &ServerConfig) -> ServerResult<PublishService> {
    config.validate()?;
    let (blobs, meta): (Arc<dyn BlobStore>, Arc<dyn MetadataStore>) = match config.storage {
        StorageBackend::Memory => (
            Arc::new(InMemoryBlobStore::with_base_url(config.public_base_url.clone())),
            Arc::new(InMemoryMetadataStore::new()),
        ),
        StorageBackend::Fs => (
            Arc::new(FsBlobStore::open(config.blob_root(), config.public_base_url.clone()).await?),
            Arc::new(FileMetadataStore::open(config.metadata_path()).await?),
        ),
    };
    info!(
        storage = config.storage.as_str(),
        data_dir = %config.data_dir.display(),
        "stores opened"
    );
    Ok(PublishService::with_config(blobs, meta, config.allocator()))
}

/// pagedrop HTTP server.
pub struct PagedropServer {
    config: ServerConfig,
    service: PublishService,
}

impl PagedropServer {
    pub fn new(config: ServerConfig, service: PublishService) -> Self {
        Self { config, service }
    }

    /// Open the configured stores and build a server over them.
    pub async fn open(config: ServerConfig) -> ServerResult<Self> {
        let service = open_service(&config).await?;
        Ok(Self::new(config, service))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> &PublishService {
        &self.service
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(AppState::new(self.service.clone(), self.config.clone()))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        info!("pagedrop server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedrop_publish::{Category, CategoryFilter, PublishRequest};

    fn fs_config(dir: &std::path::Path) -> ServerConfig {
        ServerConfig {
            data_dir: dir.to_path_buf(),
            public_base_url: "http://pages.test/files".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn memory_server_construction() {
        let config = ServerConfig { storage: StorageBackend::Memory, ..Default::default() };
        let server = PagedropServer::open(config).await.unwrap();
        assert_eq!(server.config().bind_addr.port(), 8080);
        let _router = server.router();
    }

    #[tokio::test]
    async fn fs_stores_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let service = open_service(&fs_config(dir.path())).await.unwrap();
        let request =
            PublishRequest::new(&b"<p>kept</p>"[..], "kept.html", Category::Landing, None).unwrap();
        let receipt = service.publish(request).await.unwrap();
        assert_eq!(
            receipt.public_url,
            format!("http://pages.test/files/{}/index.html", receipt.slug)
        );
        assert!(dir.path().join("blobs").join(receipt.slug.as_str()).join("index.html").exists());
        drop(service);

        let reopened = open_service(&fs_config(dir.path())).await.unwrap();
        let bytes = reopened.fetch_for_view(receipt.slug.as_str()).await.unwrap();
        assert_eq!(&bytes[..], b"<p>kept</p>");
        let rows = reopened.list(CategoryFilter::Only(Category::Landing)).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn invalid_config_is_refused() {
        let config = ServerConfig {
            storage: StorageBackend::Memory,
            slug_len: 0,
            ..Default::default()
        };
        assert!(matches!(open_service(&config).await, Err(ServerError::Config(_))));
    }

    #[tokio::test]
    async fn overlong_slugs_are_refused_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig { slug_len: 65, ..fs_config(dir.path()) };
        assert!(matches!(open_service(&config).await, Err(ServerError::Config(_))));

        let config = ServerConfig { slug_len: 64, ..fs_config(dir.path()) };
        let service = open_service(&config).await.unwrap();
        let request =
            PublishRequest::new(&b"<p>long</p>"[..], "long.html", Category::Demo, None).unwrap();
        let receipt = service.publish(request).await.unwrap();
        assert_eq!(receipt.slug.as_str().len(), 64);
        assert_eq!(
            &service.fetch_for_view(receipt.slug.as_str()).await.unwrap()[..],
            b"<p>long</p>"
        );
        drop(service);

        let reopened = open_service(&config).await.unwrap();
        assert_eq!(reopened.list(CategoryFilter::All).await.unwrap().len(), 1);
    }
}
