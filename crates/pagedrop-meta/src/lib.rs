//! Deployment metadata storage for pagedrop.
//!
//! The metadata store owns the table of [`Deployment`] rows. It is the
//! authority on slug uniqueness: [`MetadataStore::insert_if_absent`] refuses a
//! row whose slug is already taken, no matter what any caller checked before.
//!
//! # Architecture
//!
//! - Rows are keyed by [`DeploymentId`] and indexed by unique [`Slug`].
//! - The store assigns `id` and `created_at` when a row is accepted.
//! - Status moves one way, `active -> unpublished`.
//! - Listings are ordered by `created_at`, newest first.
//!
//! # Modules
//!
//! - [`error`]: Error types for metadata operations
//! - [`traits`]: The [`MetadataStore`] trait defining the storage interface
//! - [`table`]: The in-process [`DeploymentTable`] both backends share
//! - [`memory`]: In-memory [`InMemoryMetadataStore`]
//! - [`file`]: JSON-file backed [`FileMetadataStore`]
//!
//! [`Deployment`]: pagedrop_types::Deployment
//! [`DeploymentId`]: pagedrop_types::DeploymentId
//! [`Slug`]: pagedrop_types::Slug

pub mod error;
pub mod file;
pub mod memory;
pub mod table;
pub mod traits;

pub use error::{MetaError, MetaResult};
pub use file::FileMetadataStore;
pub use memory::{Clock, InMemoryMetadataStore};
pub use table::DeploymentTable;
pub use traits::MetadataStore;
