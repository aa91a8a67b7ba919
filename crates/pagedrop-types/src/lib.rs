//! Foundation types for pagedrop.
//!
//! Every other pagedrop crate depends on `pagedrop-types`. The types here are
//! plain data: they carry no storage or I/O behaviour.
//!
//! # Key Types
//!
//! - [`Slug`]: Short public identifier a deployment is addressed by
//! - [`DeploymentId`]: Opaque UUID v7 row identifier assigned at insert
//! - [`Category`]: Closed set of labels a deployment is filed under
//! - [`CategoryFilter`]: Listing filter, including the `all` sentinel
//! - [`DeploymentStatus`]: `active` or `unpublished`
//! - [`Deployment`]: The persisted metadata row

pub mod category;
pub mod deployment;
pub mod error;
pub mod id;
pub mod slug;

pub use category::{Category, CategoryFilter, ALL_SENTINEL};
pub use deployment::{Deployment, DeploymentStatus, NewDeployment};
pub use error::TypeError;
pub use id::DeploymentId;
pub use slug::{Slug, MAX_SLUG_LEN, SLUG_ALPHABET, SLUG_LEN};
