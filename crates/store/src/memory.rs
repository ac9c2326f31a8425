//! InMemoryStore - Vec-backed document store for tests and local development.
//!
//! Documents are kept in insertion order, which doubles as the store's
//! natural order. Filters, updates and aggregation pipelines are evaluated
//! with the same semantics the catalog expects from the real store.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use tracing::debug;

use crate::aggregate::run_pipeline;
use crate::error::{Result, StoreError};
use crate::query::{filter_documents, matches, values_equal};
use crate::traits::DocumentStore;
use crate::types::{DeleteAck, FindOptions, InsertAck, UpdateAck};
use crate::update::{apply_update, validate_update};

/// In-memory document collection.
///
/// Clone-friendly via Arc: clones share the same collection.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with `documents`, assigning ids where missing.
    pub fn with_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let documents = documents.into_iter().map(with_id).collect();
        Self {
            documents: Arc::new(RwLock::new(documents)),
        }
    }

    /// Number of documents currently stored
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    /// Returns true if the collection holds no documents
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<Document>>> {
        self.documents.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<Document>>> {
        self.documents.write().map_err(|_| StoreError::Poisoned)
    }

    fn update(&self, filter: &Document, update: &Document, many: bool) -> Result<UpdateAck> {
        validate_update(update)?;
        let mut docs = self.write()?;
        let mut ack = UpdateAck {
            acknowledged: true,
            ..UpdateAck::default()
        };
        for doc in docs.iter_mut() {
            if !matches(doc, filter)? {
                continue;
            }
            ack.matched_count += 1;
            if apply_update(doc, update)? {
                ack.modified_count += 1;
            }
            if !many {
                break;
            }
        }
        debug!(
            "update (many: {}) matched {} modified {}",
            many, ack.matched_count, ack.modified_count
        );
        Ok(ack)
    }
}

/// Put a fresh `_id` at the front of a document that has none.
fn with_id(document: Document) -> Document {
    if document.contains_key("_id") {
        return document;
    }
    let mut stored = Document::new();
    stored.insert("_id", ObjectId::new());
    for (key, value) in document {
        stored.insert(key, value);
    }
    stored
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn find(&self, filter: Document, options: FindOptions) -> Result<Vec<Document>> {
        let snapshot = self.read()?.clone();
        let matched = filter_documents(snapshot, &filter)?;
        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        // A zero limit means "no limit"; a negative one is treated as its magnitude
        let limit = match options.limit {
            None | Some(0) => usize::MAX,
            Some(n) => usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX),
        };
        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>> {
        let docs = self.read()?;
        for doc in docs.iter() {
            if matches(doc, &filter)? {
                return Ok(Some(doc.clone()));
            }
        }
        Ok(None)
    }

    async fn insert_one(&self, document: Document) -> Result<InsertAck> {
        let stored = with_id(document);
        let inserted_id = stored.get("_id").cloned().unwrap_or(Bson::Null);

        let mut docs = self.write()?;
        let duplicate = docs
            .iter()
            .any(|doc| doc.get("_id").is_some_and(|id| values_equal(id, &inserted_id)));
        if duplicate {
            return Err(StoreError::DuplicateKey(
                inserted_id.into_relaxed_extjson().to_string(),
            ));
        }
        docs.push(stored);

        Ok(InsertAck {
            acknowledged: true,
            inserted_id,
        })
    }

    async fn update_one(&self, filter: Document, update: Document) -> Result<UpdateAck> {
        self.update(&filter, &update, false)
    }

    async fn update_many(&self, filter: Document, update: Document) -> Result<UpdateAck> {
        self.update(&filter, &update, true)
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteAck> {
        let mut docs = self.write()?;
        let mut position = None;
        for (index, doc) in docs.iter().enumerate() {
            if matches(doc, &filter)? {
                position = Some(index);
                break;
            }
        }
        let deleted_count = match position {
            Some(index) => {
                docs.remove(index);
                1
            }
            None => 0,
        };
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count,
        })
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> Result<Vec<Document>> {
        let snapshot = self.read()?.clone();
        run_pipeline(snapshot, &pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn seeded() -> InMemoryStore {
        InMemoryStore::with_documents(vec![
            doc! { "title": "Heat", "year": 1995 },
            doc! { "title": "Ronin", "year": 1998 },
            doc! { "title": "Casino", "year": 1995 },
        ])
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_find_one_returns_it() {
        let store = InMemoryStore::new();
        let ack = store
            .insert_one(doc! { "title": "Thief", "year": 1981 })
            .await
            .unwrap();
        assert!(ack.acknowledged);
        assert!(matches!(ack.inserted_id, Bson::ObjectId(_)));

        let found = store
            .find_one(doc! { "_id": ack.inserted_id.clone() })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.keys().next().map(String::as_str), Some("_id"));
        assert_eq!(found.get_str("title").unwrap(), "Thief");
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_ids() {
        let store = InMemoryStore::new();
        store.insert_one(doc! { "_id": 7, "title": "A" }).await.unwrap();
        let second = store.insert_one(doc! { "_id": 7, "title": "B" }).await;
        assert!(matches!(second, Err(StoreError::DuplicateKey(_))));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_applies_skip_and_limit_in_natural_order() {
        let store = seeded();
        let all = store.find(doc! {}, FindOptions::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let window = store.find(doc! {}, FindOptions::window(1, 1)).await.unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].get_str("title").unwrap(), "Ronin");

        let by_year = store
            .find(doc! { "year": 1995 }, FindOptions::default())
            .await
            .unwrap();
        assert_eq!(by_year.len(), 2);
    }

    #[tokio::test]
    async fn test_update_one_touches_only_first_match() {
        let store = seeded();
        let ack = store
            .update_one(doc! { "year": 1995 }, doc! { "$set": { "rated": "R" } })
            .await
            .unwrap();
        assert_eq!((ack.matched_count, ack.modified_count), (1, 1));

        let rated = store
            .find(doc! { "rated": "R" }, FindOptions::default())
            .await
            .unwrap();
        assert_eq!(rated.len(), 1);
        assert_eq!(rated[0].get_str("title").unwrap(), "Heat");
    }

    #[tokio::test]
    async fn test_update_many_and_no_match() {
        let store = seeded();
        let ack = store
            .update_many(doc! { "year": 1995 }, doc! { "$set": { "decade": "90s" } })
            .await
            .unwrap();
        assert_eq!((ack.matched_count, ack.modified_count), (2, 2));

        let ack = store
            .update_many(doc! { "year": 1800 }, doc! { "$set": { "decade": "1800s" } })
            .await
            .unwrap();
        assert_eq!((ack.matched_count, ack.modified_count), (0, 0));
    }

    #[tokio::test]
    async fn test_invalid_update_fails_even_without_match() {
        let store = seeded();
        let result = store
            .update_one(doc! { "year": 1800 }, doc! { "title": "Replaced" })
            .await;
        assert!(matches!(result, Err(StoreError::InvalidQuery(_))));
    }

    #[tokio::test]
    async fn test_delete_one_removes_single_document() {
        let store = seeded();
        let ack = store.delete_one(doc! { "year": 1995 }).await.unwrap();
        assert_eq!(ack.deleted_count, 1);
        assert_eq!(store.len().unwrap(), 2);

        let ack = store.delete_one(doc! { "year": 1800 }).await.unwrap();
        assert_eq!(ack.deleted_count, 0);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let store = seeded();
        let shared = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = shared.documents.write().unwrap();
            panic!("writer failed");
        })
        .join();

        assert!(matches!(store.len(), Err(StoreError::Poisoned)));
        assert!(matches!(store.is_empty(), Err(StoreError::Poisoned)));
    }

    #[tokio::test]
    async fn test_aggregate_runs_pipeline() {
        let store = seeded();
        let out = store
            .aggregate(vec![
                doc! { "$sort": { "title": 1 } },
                doc! { "$project": { "_id": 0, "title": 1 } },
            ])
            .await
            .unwrap();
        assert_eq!(
            out,
            vec![
                doc! { "title": "Casino" },
                doc! { "title": "Heat" },
                doc! { "title": "Ronin" },
            ]
        );
    }
}
