//! The pagedrop publish service.
//!
//! Turns a document into a short public slug and back. [`PublishService`]
//! coordinates two independent stores:
//!
//! - a [`BlobStore`] holding the document bytes under `{slug}/index.html`
//! - a [`MetadataStore`] holding one [`Deployment`] row per slug
//!
//! There is no cross-store transaction. `publish` writes the blob first and
//! inserts the row second; if the insert fails it deletes the blob again on a
//! best-effort basis. Readers only ever find documents through rows, so an
//! orphaned blob is invisible while an orphaned row cannot occur.
//!
//! [`BlobStore`]: pagedrop_blob::BlobStore
//! [`MetadataStore`]: pagedrop_meta::MetadataStore
//! [`Deployment`]: pagedrop_types::Deployment

pub mod allocator;
pub mod error;
pub mod request;
pub mod service;

#[cfg(test)]
mod testing;

pub use allocator::{AllocatorConfig, RandomSlugSource, SlugAllocator, SlugSource};
pub use error::{ErrorKind, PublishError, PublishResult};
pub use request::{PublishReceipt, PublishRequest};
pub use service::PublishService;

// Re-export key types
pub use pagedrop_types::{
    Category, CategoryFilter, Deployment, DeploymentId, DeploymentStatus, Slug, MAX_SLUG_LEN,
};
