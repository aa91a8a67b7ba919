//! Path-addressed document storage for pagedrop.
//!
//! A blob store maps a relative path such as `k3x9q2/index.html` to the raw
//! bytes of a published document. It has no notion of slugs, categories or
//! visibility; those live in the metadata store.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`]: `HashMap`-based store for tests and embedding
//! - [`FsBlobStore`]: one file per path under a root directory
//!
//! # Design Rules
//!
//! 1. `put` never overwrites: writing to an occupied path fails.
//! 2. `delete` is best-effort and reports whether anything was removed.
//! 3. Paths are relative and may not escape the store root.
//! 4. The store never interprets blob contents.

pub mod error;
pub mod fs;
pub mod memory;
pub mod path;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
pub use path::validate_blob_path;
pub use traits::BlobStore;
