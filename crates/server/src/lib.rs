//! Server crate for the movie catalog REST API.
//!
//! ## Main Components
//!
//! - **catalog**: `MovieCatalog`, the operations behind each endpoint
//! - **routes**: the axum router and `serve`
//! - **params / json**: request parsing and document rendering
//! - **config**: clap/env configuration for the catalog and its store
//! - **error**: `ApiError` and its HTTP mapping
//! - **logging**: tracing subscriber setup shared by the binaries

pub mod catalog;
pub mod config;
pub mod error;
pub mod json;
pub mod logging;
pub mod params;
pub mod routes;

pub use catalog::{BulkUpdate, MovieCatalog};
pub use config::{CatalogArgs, CatalogConfig, ConfigError, StoreArgs};
pub use error::{ApiError, ApiResult};
pub use logging::init_tracing;
pub use routes::{router, serve};
