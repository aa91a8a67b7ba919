//! HTTP server for pagedrop.
//!
//! Accepts documents over JSON, hands out short slugs, and serves the
//! published pages back as HTML.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/v1/deploy` | Publish a document |
//! | GET | `/p/:slug` | View a published page |
//! | GET | `/files/:slug/index.html` | Same page, at its `publicUrl` |
//! | GET | `/v1/deployments` | List active deployments (`?category=`) |
//! | GET | `/v1/deployments/:slug` | One deployment row |
//! | POST | `/v1/deployments/:id/unpublish` | Hide a deployment |
//! | GET | `/v1/categories` | Known categories |
//! | GET | `/v1/health` | Liveness |
//! | GET | `/v1/info` | Build and storage info |

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ServerConfig, StorageBackend};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::{open_service, PagedropServer};
