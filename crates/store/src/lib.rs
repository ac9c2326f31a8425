//! # Store Crate
//!
//! Document-store access for the movie catalog.
//!
//! ## Main Components
//!
//! - **traits**: the `DocumentStore` contract the catalog is written against
//! - **types**: `MovieId`, `FindOptions` and the write acknowledgments
//! - **mongo**: `MongoStore`, backed by the MongoDB async driver
//! - **memory**: `InMemoryStore`, for tests and running without a database
//! - **query / update / aggregate**: the query-language evaluator behind
//!   `InMemoryStore`
//! - **error**: error types for store access
//!
//! ## Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use bson::doc;
//! use store::{DocumentStore, FindOptions, MongoStore};
//!
//! let store: Arc<dyn DocumentStore> =
//!     Arc::new(MongoStore::connect("mongodb://localhost:27017", "sample_mflix", "movies").await?);
//!
//! let nineties = store.find(doc! { "year": 1995 }, FindOptions::window(0, 20)).await?;
//! println!("{} movies from 1995", nineties.len());
//! ```

pub mod aggregate;
pub mod error;
pub mod memory;
pub mod mongo;
pub mod query;
pub mod traits;
pub mod types;
pub mod update;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use mongo::MongoStore;
pub use traits::DocumentStore;
pub use types::{looks_like_id, DeleteAck, FindOptions, InsertAck, MovieId, UpdateAck};

// The catalog builds documents and pipelines with these
pub use bson::{doc, Bson, Document};
