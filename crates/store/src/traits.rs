//! The document store contract.
//!
//! The catalog never talks to a database directly; it holds an
//! `Arc<dyn DocumentStore>` injected at construction time. `MongoStore` is the
//! production implementation and `InMemoryStore` backs tests and local runs.

use async_trait::async_trait;
use bson::Document;

use crate::error::Result;
use crate::types::{DeleteAck, FindOptions, InsertAck, UpdateAck};

/// A single collection of schema-less documents.
///
/// Every method is one round trip to the store. Absent documents are not
/// errors: lookups return `None` or an empty vector and writes report zero
/// counts in their acknowledgment.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns a short backend name (for logging)
    fn name(&self) -> &str;

    /// Documents matching `filter`, in natural order, windowed by `options`.
    async fn find(&self, filter: Document, options: FindOptions) -> Result<Vec<Document>>;

    /// First document matching `filter`, if any.
    async fn find_one(&self, filter: Document) -> Result<Option<Document>>;

    /// Insert a document, assigning an `_id` when it has none.
    async fn insert_one(&self, document: Document) -> Result<InsertAck>;

    /// Apply an update-operator document to the first match of `filter`.
    async fn update_one(&self, filter: Document, update: Document) -> Result<UpdateAck>;

    /// Apply an update-operator document to every match of `filter`.
    async fn update_many(&self, filter: Document, update: Document) -> Result<UpdateAck>;

    /// Remove at most one document matching `filter`.
    async fn delete_one(&self, filter: Document) -> Result<DeleteAck>;

    /// Run an aggregation pipeline over the collection.
    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>>;
}
