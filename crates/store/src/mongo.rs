//! MongoDB-backed document store.
//!
//! Thin adapter from `DocumentStore` onto the official async driver. The
//! driver owns connection pooling, retries and timeouts; this type adds
//! nothing on top beyond logging and result mapping.

use async_trait::async_trait;
use bson::Document;
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use tracing::{debug, info};

use crate::error::Result;
use crate::traits::DocumentStore;
use crate::types::{DeleteAck, FindOptions, InsertAck, UpdateAck};

/// A single MongoDB collection.
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<Document>,
}

impl MongoStore {
    /// Connect to a MongoDB deployment and bind to `database.collection`.
    ///
    /// # Arguments
    /// * `uri` - Connection string (e.g., "mongodb://localhost:27017")
    /// * `database` - Database name (e.g., "sample_mflix")
    /// * `collection` - Collection name (e.g., "movies")
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self> {
        info!("Connecting to MongoDB collection {}.{}", database, collection);
        let client = Client::with_uri_str(uri).await?;
        let collection = client.database(database).collection::<Document>(collection);
        Ok(Self::from_collection(collection))
    }

    /// Wrap an already configured collection handle.
    pub fn from_collection(collection: Collection<Document>) -> Self {
        Self { collection }
    }

    /// Fully qualified namespace, e.g. "sample_mflix.movies"
    pub fn namespace(&self) -> String {
        self.collection.namespace().to_string()
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn name(&self) -> &str {
        "mongodb"
    }

    async fn find(&self, filter: Document, options: FindOptions) -> Result<Vec<Document>> {
        debug!("find {:?} (skip: {}, limit: {:?})", filter, options.skip, options.limit);
        let driver_options = mongodb::options::FindOptions::builder()
            .skip(options.skip)
            .limit(options.limit)
            .build();
        let cursor = self.collection.find(filter, driver_options).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>> {
        debug!("find_one {:?}", filter);
        Ok(self.collection.find_one(filter, None).await?)
    }

    async fn insert_one(&self, document: Document) -> Result<InsertAck> {
        let result = self.collection.insert_one(document, None).await?;
        debug!("insert_one assigned {}", result.inserted_id);
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: result.inserted_id,
        })
    }

    async fn update_one(&self, filter: Document, update: Document) -> Result<UpdateAck> {
        debug!("update_one {:?} with {:?}", filter, update);
        let result = self.collection.update_one(filter, update, None).await?;
        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn update_many(&self, filter: Document, update: Document) -> Result<UpdateAck> {
        debug!("update_many {:?} with {:?}", filter, update);
        let result = self.collection.update_many(filter, update, None).await?;
        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_id: result.upserted_id,
        })
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteAck> {
        debug!("delete_one {:?}", filter);
        let result = self.collection.delete_one(filter, None).await?;
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        debug!("aggregate with {} stages", pipeline.len());
        let cursor = self.collection.aggregate(pipeline, None).await?;
        Ok(cursor.try_collect().await?)
    }
}
